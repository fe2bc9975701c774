use std::fmt;

/// Elevators are named `A`, `B`, ... in the order they are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElevatorId(pub u8);

impl ElevatorId {
    pub fn as_char(self) -> char {
        match self.0 {
            n @ 0..=25 => (b'A' + n) as char,
            _ => '?',
        }
    }
}

impl fmt::Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0..=25 => write!(f, "{}", self.as_char()),
            n => write!(f, "#{}", n),
        }
    }
}
