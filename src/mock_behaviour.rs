//! This module provides ways to tweak mocked task sources and notifiers, so that they can
//! return errors on some tests

use std::error::Error;

/// This stores some behaviour tweaks, that describe how a mocked instance will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    // From the TaskSource trait
    pub pending_reminders_behaviour: (u32, u32),
    pub mark_reminder_sent_behaviour: (u32, u32),

    // From the Notifier trait
    pub send_chat_behaviour: (u32, u32),
    pub send_email_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            pending_reminders_behaviour: (0, n_fails),
            mark_reminder_sent_behaviour: (0, n_fails),
            send_chat_behaviour: (0, n_fails),
            send_email_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_pending_reminders(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.pending_reminders_behaviour, "pending_reminders")
    }
    pub fn can_mark_reminder_sent(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.mark_reminder_sent_behaviour, "mark_reminder_sent")
    }
    pub fn can_send_chat(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.send_chat_behaviour, "send_chat")
    }
    pub fn can_send_email(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.send_email_behaviour, "send_email")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), Box<dyn Error>> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value).into())
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_behaviour() {
        let mut ok = MockBehaviour::new();
        assert!(ok.can_pending_reminders().is_ok());
        assert!(ok.can_pending_reminders().is_ok());
        assert!(ok.can_send_chat().is_ok());
        assert!(ok.can_send_email().is_ok());
        assert!(ok.can_mark_reminder_sent().is_ok());

        let mut now = MockBehaviour::fail_now(2);
        assert!(now.can_pending_reminders().is_err());
        assert!(now.can_send_chat().is_err());
        assert!(now.can_send_chat().is_err());
        assert!(now.can_pending_reminders().is_err());
        assert!(now.can_pending_reminders().is_ok());
        assert!(now.can_send_chat().is_ok());

        let mut custom = MockBehaviour{
            pending_reminders_behaviour: (0,1),
            send_chat_behaviour: (1,3),
            ..MockBehaviour::default()
        };
        assert!(custom.can_pending_reminders().is_err());
        assert!(custom.can_pending_reminders().is_ok());
        assert!(custom.can_pending_reminders().is_ok());
        assert!(custom.can_send_chat().is_ok());
        assert!(custom.can_send_chat().is_err());
        assert!(custom.can_send_chat().is_err());
        assert!(custom.can_send_chat().is_err());
        assert!(custom.can_send_chat().is_ok());
        assert!(custom.can_send_chat().is_ok());

        let mut suspended = MockBehaviour::fail_now(2);
        suspended.suspend();
        assert!(suspended.can_mark_reminder_sent().is_ok());
        suspended.resume();
        assert!(suspended.can_mark_reminder_sent().is_err());
    }
}
