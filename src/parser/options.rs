use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ParseFlags: u32 {
        /// Run every component in the default process unless it asks for "system"
        const IGNORE_PROCESSES = 1 << 3;
    }
}

/// Knobs that stay fixed for a whole parse
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub flags: ParseFlags,

    /// Process names forced back into the application's main process
    pub separate_processes: Vec<String>,

    /// Unknown tags and incomplete permission children become errors
    pub strict: bool,

    /// Prefer `android:roundIcon` over `android:icon`
    pub use_round_icon: bool,

    /// Keep deferred errors as warnings regardless of target SDK
    pub tolerate_deferred_errors: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_flags(mut self, flags: ParseFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_separate_processes(mut self, processes: Vec<String>) -> Self {
        self.separate_processes = processes;
        self
    }

    pub fn with_round_icon(mut self, use_round_icon: bool) -> Self {
        self.use_round_icon = use_round_icon;
        self
    }
}
