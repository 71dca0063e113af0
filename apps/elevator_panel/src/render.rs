//! Plain-text rendering of the control surface.

use client_core::{ButtonControl, ButtonVisual, ElevatorPhase, PanelView, Validity};
use shared::domain::Direction;

fn render_button(button: &ButtonControl) -> String {
    let mark = match button.visual {
        ButtonVisual::Neutral => "",
        ButtonVisual::PendingSuccess => "+",
        ButtonVisual::PendingFailure => "!",
    };
    let validity = match button.validity {
        Validity::Unmarked => "",
        Validity::Invalid => "~",
        Validity::Disabled => "x",
    };
    format!("[{validity}{}{mark}]", button.label)
}

pub fn render_view(view: &PanelView) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "== {} ({}) ==\n",
        view.elevator_label, view.elevator
    ));

    match view.car.floor {
        Some(floor) => out.push_str(&format!(
            "car: floor {} (+{}px) | {}\n",
            floor.label(),
            view.car.offset_px,
            view.car.door_text
        )),
        None => out.push_str("car: waiting for first status\n"),
    }

    let buttons: Vec<String> = view.buttons.iter().map(render_button).collect();
    out.push_str("buttons: ");
    out.push_str(&buttons.join(" "));
    out.push('\n');

    if !view.trace.text.is_empty() {
        out.push_str("trace:\n");
        for line in view.trace.text.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

pub fn describe_phase(phase: ElevatorPhase) -> &'static str {
    match phase {
        ElevatorPhase::Idle => "idle",
        ElevatorPhase::Pending => "request queued",
        ElevatorPhase::Arriving(Some(Direction::Up)) => "moving up",
        ElevatorPhase::Arriving(Some(Direction::Down)) => "moving down",
        ElevatorPhase::Arriving(None) => "moving",
        ElevatorPhase::DoorsOpen => "doors open",
    }
}

#[cfg(test)]
mod tests {
    use client_core::{panel::Panel, CarView, TraceLogView};
    use shared::domain::{ElevatorId, Floor};

    use super::*;

    fn view() -> PanelView {
        PanelView {
            elevator: ElevatorId::new("E1"),
            elevator_label: "E1 (even)".into(),
            generation: 0,
            buttons: Panel::new(0).buttons().to_vec(),
            car: CarView::default(),
            trace: TraceLogView::default(),
        }
    }

    #[test]
    fn phases_have_operator_wording() {
        assert_eq!(describe_phase(ElevatorPhase::Idle), "idle");
        assert_eq!(
            describe_phase(ElevatorPhase::Arriving(Some(Direction::Down))),
            "moving down"
        );
        assert_eq!(describe_phase(ElevatorPhase::DoorsOpen), "doors open");
    }

    #[test]
    fn renders_waiting_car_before_first_poll() {
        let text = render_view(&view());
        assert!(text.starts_with("== E1 (even) (E1) ==\n"));
        assert!(text.contains("car: waiting for first status"));
        assert!(text.contains("[Ground Floor] [1] [2]"));
        assert!(!text.contains("trace:"));
    }

    #[test]
    fn renders_marks_car_and_trace() {
        let mut view = view();
        view.buttons[5].visual = ButtonVisual::PendingSuccess;
        view.buttons[6].visual = ButtonVisual::PendingFailure;
        view.buttons[7].validity = Validity::Disabled;
        view.car.update(Floor::new(3).expect("floor"), true);
        view.trace
            .rebuild(Some(&["Moving up to floor 3.".to_string()][..]), Some("q1>q3"));

        let text = render_view(&view);
        assert!(text.contains("car: floor 3 (+90px) | Door Open"));
        assert!(text.contains("[5+] [6!] [x7]"));
        assert!(text.contains("trace:\n  Moving up to floor 3.\n  q1>q3\n"));
    }
}
