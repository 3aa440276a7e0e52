pub mod header_section;
pub mod help_bar;
pub mod overview_host;

// Re-export core Component trait
pub use overview_dispatch::Component;

pub use header_section::{HeaderSection, HeaderSectionProps, SUBTITLE_SUBJ, TITLE_SUBJ};
pub use help_bar::{HelpBar, HelpBarProps};
pub use overview_host::{
    subtitle, OverviewHost, OverviewHostProps, OVERVIEW_HOST_TITLE, STATS_SUBJ,
};
