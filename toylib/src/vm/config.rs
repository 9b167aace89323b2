#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VmConfig {
    /// Upper bound on dispatched instructions; `None` runs until the program
    /// halts or faults.
    pub max_instructions: Option<u64>,
    /// Log every dispatched instruction at `trace` level.
    pub trace: bool,
}
