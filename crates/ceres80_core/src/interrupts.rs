use crate::error::StateError;

/// Save-state size of the interrupt lines.
pub const INTERRUPT_STATE_LEN: usize = 2;

/// Single-source interrupt handshake between a device and the CPU.
///
/// The Ceres80 only has one interrupting device (the CTC), wired for mode 1,
/// so the whole daisy chain collapses into two lines:
///
/// - `request`: raised by the device, cleared by the CPU when it accepts.
/// - `acknowledge`: set by the CPU when it accepts, cleared by the device
///   once it has observed it.
///
/// Supporting more sources would need a priority-ordered request queue in
/// place of these two booleans.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InterruptManager {
    request: bool,
    acknowledge: bool,
}

impl InterruptManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the request line and drop any stale acknowledge.
    ///
    /// Only one request can be in flight. A raise while a request is still
    /// pending is rejected: the lines are left as they are and `false` is
    /// returned.
    pub fn raise_interrupt(&mut self) -> bool {
        if self.request {
            log::warn!("interrupt raised while another request is pending");
            return false;
        }
        self.request = true;
        self.acknowledge = false;
        true
    }

    /// CPU side of the handshake: accept the pending request.
    pub fn acknowledge_interrupt(&mut self) {
        self.acknowledge = true;
        self.request = false;
    }

    /// Device side of the handshake: the acknowledge has been seen.
    pub fn clear_acknowledge(&mut self) {
        self.acknowledge = false;
    }

    #[inline]
    pub fn is_interrupt_pending(&self) -> bool {
        self.request
    }

    #[inline]
    pub fn is_acknowledge_pending(&self) -> bool {
        self.acknowledge
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Request line, then acknowledge line, one byte each.
    pub fn save_state(&self) -> [u8; INTERRUPT_STATE_LEN] {
        [self.request as u8, self.acknowledge as u8]
    }

    pub fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let [request, acknowledge]: [u8; INTERRUPT_STATE_LEN] =
            data.try_into().map_err(|_| StateError::LengthMismatch {
                expected: INTERRUPT_STATE_LEN,
                actual: data.len(),
            })?;
        self.request = request != 0;
        self.acknowledge = acknowledge != 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_then_acknowledge_moves_request_to_acknowledge() {
        let mut irq = InterruptManager::new();
        assert!(irq.raise_interrupt());
        assert!(irq.is_interrupt_pending());
        assert!(!irq.is_acknowledge_pending());

        irq.acknowledge_interrupt();
        assert!(!irq.is_interrupt_pending());
        assert!(irq.is_acknowledge_pending());

        irq.clear_acknowledge();
        assert_eq!(irq, InterruptManager::default());
    }

    #[test]
    fn second_raise_is_rejected_while_request_pending() {
        let mut irq = InterruptManager::new();
        assert!(irq.raise_interrupt());
        assert!(!irq.raise_interrupt());
        assert!(irq.is_interrupt_pending());
        assert!(!irq.is_acknowledge_pending());
    }

    #[test]
    fn raise_clears_unclaimed_acknowledge() {
        let mut irq = InterruptManager::new();
        assert!(irq.raise_interrupt());
        irq.acknowledge_interrupt();

        // Nobody cleared the acknowledge; a new request still gets through.
        assert!(irq.raise_interrupt());
        assert!(irq.is_interrupt_pending());
        assert!(!irq.is_acknowledge_pending());
    }

    #[test]
    fn state_round_trip() {
        let mut irq = InterruptManager::new();
        irq.raise_interrupt();
        let state = irq.save_state();
        assert_eq!(state, [1, 0]);

        let mut restored = InterruptManager::new();
        restored.load_state(&state).unwrap();
        assert_eq!(restored, irq);

        assert_eq!(
            restored.load_state(&[1]),
            Err(StateError::LengthMismatch {
                expected: INTERRUPT_STATE_LEN,
                actual: 1
            })
        );
        assert_eq!(restored, irq);
    }
}
