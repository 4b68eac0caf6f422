/// The kinds of interrupt the console raises.
///
/// Only the PPU's non-maskable interrupt is modelled, `BRK` is handled as an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    Nmi,
}

impl InterruptKind {
    /// Location of the vector the CPU jumps through when servicing this interrupt.
    pub fn vector(&self) -> usize {
        match self {
            InterruptKind::Nmi => crate::core::NMI_VECTOR,
        }
    }
}

/// A pending interrupt request.
///
/// At most one request is held, it is serviced right after the instruction that is currently
/// executing completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupt {
    pub kind: InterruptKind,
    pub pending: bool,
    /// The PC that was pushed when the request was last serviced
    pub return_addr: u16,
}

impl Default for Interrupt {
    fn default() -> Self {
        Interrupt {
            kind: InterruptKind::Nmi,
            pending: false,
            return_addr: 0,
        }
    }
}

impl Interrupt {
    /// Raise the interrupt, a request that is already pending is not queued twice.
    pub fn request(&mut self) {
        self.pending = true;
    }
    /// Take the pending request, recording the address execution will resume at.
    ///
    /// Returns `None` if nothing is pending.
    /// ```
    /// use tinynes::core::{Interrupt, InterruptKind};
    /// let mut nmi = Interrupt::default();
    /// assert_eq!(nmi.take(0x8000), None);
    /// nmi.request();
    /// nmi.request();
    /// assert_eq!(nmi.take(0x8000), Some(InterruptKind::Nmi));
    /// assert_eq!(nmi.return_addr, 0x8000);
    /// assert_eq!(nmi.take(0x8000), None);
    /// ```
    pub fn take(&mut self, return_addr: u16) -> Option<InterruptKind> {
        if self.pending {
            self.pending = false;
            self.return_addr = return_addr;
            Some(self.kind)
        } else {
            None
        }
    }
}
