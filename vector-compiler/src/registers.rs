// vector-compiler/src/registers.rs
// SH4 register state model: poisoned contexts, bank lookup and pair aliasing

use std::fmt;

/// Sentinel telling the harness a slot is neither initialized nor checked.
pub const POISON: u32 = 0xbaad_f00d;

/// Width of every indexed register bank.
pub const BANK_SLOTS: usize = 16;

/// Annotation direction: initial state or expected final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "IN" => Some(Direction::In),
            "OUT" => Some(Direction::Out),
            _ => None,
        }
    }
}

/// Register classes an annotation may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterBank {
    /// Floating-point status/control register (scalar).
    Fpscr,
    /// General purpose registers r0-r15.
    R,
    /// Single precision registers fr0-fr15.
    Fr,
    /// Extended single precision registers xf0-xf15.
    Xf,
    /// Double precision view over fr pairs.
    Dr,
    /// Extended double precision view over xf pairs.
    Xd,
}

/// Lower-case annotation names for each bank.
const BANK_NAMES: [(&str, RegisterBank); 6] = [
    ("fpscr", RegisterBank::Fpscr),
    ("r", RegisterBank::R),
    ("fr", RegisterBank::Fr),
    ("xf", RegisterBank::Xf),
    ("dr", RegisterBank::Dr),
    ("xd", RegisterBank::Xd),
];

impl RegisterBank {
    /// Look up a bank by its annotation name, ignoring case.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        BANK_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, bank)| *bank)
    }

    pub fn name(self) -> &'static str {
        BANK_NAMES
            .iter()
            .find(|(_, bank)| *bank == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, RegisterBank::Fpscr)
    }

    /// The 32-bit bank a 64-bit register view overlaps, if this is one.
    pub fn aliased(self) -> Option<RegisterBank> {
        match self {
            RegisterBank::Dr => Some(RegisterBank::Fr),
            RegisterBank::Xd => Some(RegisterBank::Xf),
            _ => None,
        }
    }
}

impl fmt::Display for RegisterBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated register assignment ready to apply to a context.
///
/// Only constructed through [`RegisterWrite::new`], so the index always fits
/// the bank shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    bank: RegisterBank,
    index: Option<usize>,
    value: u64,
}

impl RegisterWrite {
    /// Build a write for `bank`, checking the index against the bank shape.
    pub fn new(bank: RegisterBank, index: Option<usize>, value: u64) -> Result<Self, String> {
        match (bank.is_scalar(), index) {
            (true, Some(index)) => return Err(format!("{} takes no index, got {}", bank, index)),
            (false, None) => return Err(format!("{} requires a register index", bank)),
            (false, Some(index)) => {
                let last = if bank.aliased().is_some() { index + 1 } else { index };
                if last >= BANK_SLOTS {
                    return Err(format!("{}{} index out of range", bank, index));
                }
            }
            (true, None) => {}
        }
        Ok(Self { bank, index, value })
    }

    pub fn bank(&self) -> RegisterBank {
        self.bank
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// One full register snapshot as consumed by the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterContext {
    pub fpscr: u32,
    pub r: [u32; BANK_SLOTS],
    pub fr: [u32; BANK_SLOTS],
    pub xf: [u32; BANK_SLOTS],
}

impl Default for RegisterContext {
    fn default() -> Self {
        Self {
            fpscr: POISON,
            r: [POISON; BANK_SLOTS],
            fr: [POISON; BANK_SLOTS],
            xf: [POISON; BANK_SLOTS],
        }
    }
}

impl RegisterContext {
    pub fn apply(&mut self, write: RegisterWrite) {
        let RegisterWrite { bank, index, value } = write;
        let slots = match bank {
            RegisterBank::Fpscr => {
                self.fpscr = mask(value);
                return;
            }
            RegisterBank::R => &mut self.r,
            RegisterBank::Fr | RegisterBank::Dr => &mut self.fr,
            RegisterBank::Xf | RegisterBank::Xd => &mut self.xf,
        };
        // RegisterWrite::new rejects indexed banks without an index
        let Some(index) = index else {
            unreachable!("{} write without an index", bank)
        };
        if bank.aliased().is_some() {
            // dr/xd registers overlap an fr/xf pair: low word first
            slots[index] = mask(value);
            slots[index + 1] = mask(value >> 32);
        } else {
            slots[index] = mask(value);
        }
    }
}

/// Truncate a literal to the 32-bit slot width.
pub fn mask(value: u64) -> u32 {
    (value & 0xffff_ffff) as u32
}

pub fn format_scalar(value: u32) -> String {
    format!("{:#x}", value)
}

/// Render a bank as comma-separated hex literals in slot order.
pub fn format_bank(slots: &[u32; BANK_SLOTS]) -> String {
    slots
        .iter()
        .map(|&value| format_scalar(value))
        .collect::<Vec<_>>()
        .join(",")
}
