// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The two-fence protocol around the order counter.

Every recording pass touches the counter block twice: a clear, then many fragment-stage
atomic increments.  Two fences order those touches:

* `barrier0`: the clear happens-before every fragment increment of the same recording.
* `barrier1`: every fragment increment happens-before the next recording's clear.

wgpu does not expose fences as objects.  Instead its resource tracker places a barrier
wherever the counter buffer changes usage (copy destination for the clear, read/write
storage for the draws) and serializes submissions on a queue.  The schedule here is what
keeps the pairing explicit: the recorder declares each wait and signal as it encodes, the
events are mirrored as debug markers in the command stream, and [`FenceSchedule::validate`]
checks that the declared order is the one the protocol requires.
*/

/// One of the two fences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fence {
    /// Counter clear → fragment increments.
    Barrier0,
    /// Fragment increments → next counter clear.
    Barrier1,
}

impl Fence {
    pub const fn label(self) -> &'static str {
        match self {
            Fence::Barrier0 => "barrier0",
            Fence::Barrier1 => "barrier1",
        }
    }
}

/// One encoded step of a recording pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenceEvent {
    Wait(Fence),
    Signal(Fence),
    /// The counter block was cleared.
    ClearCounters,
    /// Fragment work for the variant at this index.
    Draw(usize),
}

impl FenceEvent {
    /// Text of the debug marker inserted for this event.
    pub fn marker(&self) -> String {
        match self {
            FenceEvent::Wait(f) => format!("wait {}", f.label()),
            FenceEvent::Signal(f) => format!("signal {}", f.label()),
            FenceEvent::ClearCounters => "clear counters".to_string(),
            FenceEvent::Draw(i) => format!("record variant {i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("counter clear at step {0} was not preceded by a wait on barrier1")]
    ClearWithoutWait(usize),
    #[error("counter clear at step {0} is not followed by a barrier0 signal")]
    ClearWithoutSignal(usize),
    #[error("draw at step {0} does not wait on barrier0 after the clear")]
    DrawWithoutWait(usize),
    #[error("draw at step {0} is not followed by a barrier1 signal")]
    DrawWithoutSignal(usize),
    #[error("draw at step {0} precedes any counter clear")]
    DrawBeforeClear(usize),
}

/**
Events of one recording pass, in encoding order.

```
use raster_order::images::fence::{Fence, FenceEvent, FenceSchedule};

let mut schedule = FenceSchedule::new();
schedule.push(FenceEvent::Wait(Fence::Barrier1));
schedule.push(FenceEvent::ClearCounters);
schedule.push(FenceEvent::Signal(Fence::Barrier0));
schedule.push(FenceEvent::Wait(Fence::Barrier0));
schedule.push(FenceEvent::Draw(0));
schedule.push(FenceEvent::Signal(Fence::Barrier1));
assert!(schedule.validate().is_ok());
```
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceSchedule {
    events: Vec<FenceEvent>,
}

impl FenceSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: FenceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[FenceEvent] {
        &self.events
    }

    /**
    Checks the happens-before pairing.

    * every clear is immediately preceded by `Wait(Barrier1)` and immediately followed by
      `Signal(Barrier0)`;
    * every draw comes after a clear, is immediately preceded by `Wait(Barrier0)`, and
      immediately followed by `Signal(Barrier1)`.
    */
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let events = &self.events;
        let mut cleared = false;
        for (step, event) in events.iter().enumerate() {
            let before = step.checked_sub(1).and_then(|i| events.get(i));
            let after = events.get(step + 1);
            match event {
                FenceEvent::ClearCounters => {
                    if before != Some(&FenceEvent::Wait(Fence::Barrier1)) {
                        return Err(ScheduleError::ClearWithoutWait(step));
                    }
                    if after != Some(&FenceEvent::Signal(Fence::Barrier0)) {
                        return Err(ScheduleError::ClearWithoutSignal(step));
                    }
                    cleared = true;
                }
                FenceEvent::Draw(_) => {
                    if !cleared {
                        return Err(ScheduleError::DrawBeforeClear(step));
                    }
                    if before != Some(&FenceEvent::Wait(Fence::Barrier0)) {
                        return Err(ScheduleError::DrawWithoutWait(step));
                    }
                    if after != Some(&FenceEvent::Signal(Fence::Barrier1)) {
                        return Err(ScheduleError::DrawWithoutSignal(step));
                    }
                }
                FenceEvent::Wait(_) | FenceEvent::Signal(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(variants: usize) -> FenceSchedule {
        let mut schedule = FenceSchedule::new();
        schedule.push(FenceEvent::Wait(Fence::Barrier1));
        schedule.push(FenceEvent::ClearCounters);
        schedule.push(FenceEvent::Signal(Fence::Barrier0));
        for i in 0..variants {
            schedule.push(FenceEvent::Wait(Fence::Barrier0));
            schedule.push(FenceEvent::Draw(i));
            schedule.push(FenceEvent::Signal(Fence::Barrier1));
        }
        schedule
    }

    #[test]
    fn well_formed_recordings_pass() {
        for variants in 1..4 {
            assert_eq!(recording(variants).validate(), Ok(()));
        }
    }

    #[test]
    fn clear_must_wait_for_previous_fragments() {
        let mut schedule = recording(1);
        schedule.events.remove(0);
        assert_eq!(schedule.validate(), Err(ScheduleError::ClearWithoutWait(0)));
    }

    #[test]
    fn clear_must_signal() {
        let mut schedule = recording(1);
        schedule.events.remove(2);
        assert_eq!(schedule.validate(), Err(ScheduleError::ClearWithoutSignal(1)));
    }

    #[test]
    fn draw_must_wait_for_clear() {
        let mut schedule = recording(2);
        //drop the second variant's wait
        schedule.events.remove(6);
        assert_eq!(schedule.validate(), Err(ScheduleError::DrawWithoutWait(6)));
    }

    #[test]
    fn draw_must_signal() {
        let mut schedule = recording(1);
        schedule.events.pop();
        assert_eq!(schedule.validate(), Err(ScheduleError::DrawWithoutSignal(4)));
    }

    #[test]
    fn draw_before_clear_is_rejected() {
        let mut schedule = FenceSchedule::new();
        schedule.push(FenceEvent::Wait(Fence::Barrier0));
        schedule.push(FenceEvent::Draw(0));
        schedule.push(FenceEvent::Signal(Fence::Barrier1));
        assert_eq!(schedule.validate(), Err(ScheduleError::DrawBeforeClear(1)));
    }

    #[test]
    fn markers() {
        assert_eq!(FenceEvent::Wait(Fence::Barrier1).marker(), "wait barrier1");
        assert_eq!(FenceEvent::Draw(2).marker(), "record variant 2");
    }
}
