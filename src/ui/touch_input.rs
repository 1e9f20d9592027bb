//! Translation of egui input events into session touch batches
//!
//! egui reports touches one event at a time. Consecutive events of the same
//! phase are grouped into one [`TouchEvent`], which keeps the batch order the
//! platform delivered and gives sticks the "first contact in the batch" they
//! tie-break on.

use eframe::egui;
use tracing::trace;

use crate::controller::{Contact, ContactId};
use crate::session::{TouchEvent, TouchPhase};

/// Contact id used for the emulated mouse touch
///
/// egui touch ids are hashes of the platform id, the top value is reserved.
pub const MOUSE_CONTACT: ContactId = ContactId::new(u64::MAX);

#[derive(Debug, Default)]
pub struct TouchInput {
    emulate_mouse: bool,
    mouse_down: bool,
}

impl TouchInput {
    pub fn new(emulate_mouse: bool) -> Self {
        Self {
            emulate_mouse,
            mouse_down: false,
        }
    }

    /// Groups the touch events of one frame into phase batches
    pub fn translate(&mut self, events: &[egui::Event]) -> Vec<TouchEvent> {
        let mut batches: Vec<TouchEvent> = Vec::new();
        // egui-winit mirrors the first finger as pointer events
        let emulate_mouse =
            self.emulate_mouse && !events.iter().any(|e| matches!(e, egui::Event::Touch { .. }));

        for event in events {
            let Some((phase, contact)) = self.classify(event, emulate_mouse) else {
                continue;
            };

            match batches.last_mut() {
                Some(batch) if batch.phase == phase => {
                    // A contact moving twice in one frame only needs its latest position
                    if let Some(existing) = batch.contacts.iter_mut().find(|c| c.id == contact.id) {
                        *existing = contact;
                    } else {
                        batch.contacts.push(contact);
                    }
                }
                _ => batches.push(TouchEvent::new(phase, vec![contact])),
            }
        }

        if !batches.is_empty() {
            trace!("Translated {} input event(s) into {} batch(es)", events.len(), batches.len());
        }
        batches
    }

    fn classify(&mut self, event: &egui::Event, emulate_mouse: bool) -> Option<(TouchPhase, Contact)> {
        match event {
            egui::Event::Touch { id, phase, pos, .. } => {
                let phase = match phase {
                    egui::TouchPhase::Start => TouchPhase::Start,
                    egui::TouchPhase::Move => TouchPhase::Move,
                    egui::TouchPhase::End => TouchPhase::End,
                    egui::TouchPhase::Cancel => TouchPhase::Cancel,
                };
                Some((phase, Contact::new(id.0, f64::from(pos.x), f64::from(pos.y))))
            }
            _ if emulate_mouse => self.classify_mouse(event),
            _ => None,
        }
    }

    fn classify_mouse(&mut self, event: &egui::Event) -> Option<(TouchPhase, Contact)> {
        let mouse = |pos: egui::Pos2| Contact::new(MOUSE_CONTACT, f64::from(pos.x), f64::from(pos.y));

        match event {
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => {
                if *pressed && !self.mouse_down {
                    self.mouse_down = true;
                    Some((TouchPhase::Start, mouse(*pos)))
                } else if !*pressed && self.mouse_down {
                    self.mouse_down = false;
                    Some((TouchPhase::End, mouse(*pos)))
                } else {
                    None
                }
            }
            egui::Event::PointerMoved(pos) if self.mouse_down => Some((TouchPhase::Move, mouse(*pos))),
            egui::Event::PointerGone if self.mouse_down => {
                self.mouse_down = false;
                Some((TouchPhase::Cancel, mouse(egui::Pos2::ZERO)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: u64, phase: egui::TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(id),
            phase,
            pos: egui::pos2(x, y),
            force: None,
        }
    }

    fn button(pressed: bool, x: f32, y: f32) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    #[test]
    fn test_consecutive_phases_are_batched() {
        let mut input = TouchInput::new(false);
        let batches = input.translate(&[
            touch(1, egui::TouchPhase::Start, 10.0, 10.0),
            touch(2, egui::TouchPhase::Start, 20.0, 20.0),
            touch(1, egui::TouchPhase::Move, 11.0, 10.0),
            touch(1, egui::TouchPhase::Move, 12.0, 10.0),
            touch(2, egui::TouchPhase::End, 20.0, 20.0),
        ]);

        assert_eq!(
            batches,
            vec![
                TouchEvent::start(vec![Contact::new(1, 10.0, 10.0), Contact::new(2, 20.0, 20.0)]),
                TouchEvent::moved(vec![Contact::new(1, 12.0, 10.0)]),
                TouchEvent::end(vec![Contact::new(2, 20.0, 20.0)]),
            ]
        );
    }

    #[test]
    fn test_cancel_phase_is_kept() {
        let mut input = TouchInput::new(false);
        let batches = input.translate(&[touch(3, egui::TouchPhase::Cancel, 1.0, 1.0)]);
        assert_eq!(batches[0].phase, TouchPhase::Cancel);
    }

    #[test]
    fn test_mouse_ignored_without_emulation() {
        let mut input = TouchInput::new(false);
        assert!(input
            .translate(&[button(true, 5.0, 5.0), egui::Event::PointerMoved(egui::pos2(6.0, 6.0))])
            .is_empty());
    }

    #[test]
    fn test_mouse_emulates_single_contact() {
        let mut input = TouchInput::new(true);
        let batches = input.translate(&[
            egui::Event::PointerMoved(egui::pos2(1.0, 1.0)),
            button(true, 5.0, 5.0),
            egui::Event::PointerMoved(egui::pos2(6.0, 7.0)),
            button(false, 6.0, 7.0),
        ]);

        let phases: Vec<TouchPhase> = batches.iter().map(|b| b.phase).collect();
        assert_eq!(phases, vec![TouchPhase::Start, TouchPhase::Move, TouchPhase::End]);
        assert!(batches.iter().all(|b| b.contacts[0].id == MOUSE_CONTACT));
        assert_eq!(batches[1].contacts[0].position().y, 7.0);
    }

    #[test]
    fn test_touch_frame_skips_mouse_emulation() {
        let mut input = TouchInput::new(true);
        let batches = input.translate(&[
            touch(4, egui::TouchPhase::Start, 30.0, 40.0),
            button(true, 30.0, 40.0),
            egui::Event::PointerMoved(egui::pos2(30.0, 40.0)),
        ]);

        assert_eq!(batches, vec![TouchEvent::start(vec![Contact::new(4, 30.0, 40.0)])]);

        // A later mouse-only frame is still emulated
        let batches = input.translate(&[button(true, 5.0, 5.0)]);
        assert_eq!(batches[0].contacts[0].id, MOUSE_CONTACT);
    }
}
