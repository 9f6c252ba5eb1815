// vector-compiler/src/target.rs
// Fixed layout contract shared with the emulator's test harness

/// Link layout and descriptor naming for one guest architecture.
///
/// The addresses must match where the harness copies the binary before
/// resetting the CPU; changing them shifts every recorded offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Short architecture name used in log lines.
    pub name: &'static str,
    /// Macro each descriptor line invokes.
    pub descriptor_macro: &'static str,
    /// Virtual address the text section is linked at.
    pub text_base: u32,
    pub entry: u32,
    /// Section dropped when flattening the linked image.
    pub stripped_section: &'static str,
}

/// Dreamcast SH4: test code runs from the start of the 1ST_READ region.
pub const SH4: Target = Target {
    name: "sh4",
    descriptor_macro: "TEST_SH4",
    text_base: 0x8c01_0000,
    entry: 0x8c01_0000,
    stripped_section: ".sec1",
};
