use super::passenger::PassengerRef;

/// A button press: the floor it came from and the passenger who pressed it.
#[derive(Debug, Clone)]
pub struct Request {
    pub floor: u8,
    pub passenger: PassengerRef,
}

impl Request {
    pub fn new(floor: u8, passenger: PassengerRef) -> Self {
        Request { floor, passenger }
    }
}
