use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use ev_planner::{
    DeadlineState,
    PlanState,
    PlannerOutputs,
    RateSlot,
    TonightPlan,
    core::interval::SLOT,
    quantity::rate::PencePerKilowattHour,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

/// Merged timeline, marking which slots come from the confirmed prices.
pub fn build_rates_table(rates: &[RateSlot], confirmed: &[RateSlot]) -> Table {
    let mean_price = if rates.is_empty() {
        PencePerKilowattHour::ZERO
    } else {
        #[expect(clippy::cast_precision_loss)]
        let n_rates = rates.len() as f64;
        rates.iter().map(|slot| slot.price).sum::<PencePerKilowattHour>() / n_rates
    };

    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Price", "Source"]);
    for slot in rates {
        let is_confirmed = confirmed.iter().any(|confirmed| confirmed.start == slot.start);
        table.add_row(vec![
            Cell::new(slot.start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(slot.start.format("%H:%M")),
            Cell::new((slot.start + SLOT).format("%H:%M"))
                .add_attribute(Attribute::Dim),
            Cell::new(slot.price).set_alignment(CellAlignment::Right).fg(
                if slot.price.0 < 0.0 {
                    Color::Cyan
                } else if slot.price >= mean_price {
                    Color::Red
                } else {
                    Color::Green
                },
            ),
            if is_confirmed {
                Cell::new("confirmed")
            } else {
                Cell::new("forecast").add_attribute(Attribute::Dim)
            },
        ]);
    }
    table
}

pub fn build_plan_table(outputs: &PlannerOutputs) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "State", "Date", "Start", "End", "Duration", "Reason"]);
    table.add_row(plan_row("Tonight", &outputs.tonight));
    if let Some(next_charge) = &outputs.next_charge {
        table.add_row(plan_row("Next", next_charge));
    }
    table.add_row(vec![
        Cell::new("Deadline").add_attribute(Attribute::Bold),
        Cell::new(outputs.deadline.status).fg(match outputs.deadline.status {
            DeadlineState::OnTrack => Color::Green,
            DeadlineState::AtRisk => Color::Red,
            DeadlineState::Disabled => Color::DarkGrey,
        }),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(&outputs.deadline.summary),
    ]);
    table
}

fn plan_row(label: &str, plan: &TonightPlan) -> Vec<Cell> {
    let (date, start, end) = plan.window().map_or_else(Default::default, |window| {
        (
            window.start.format("%b %d").to_string(),
            window.start.format("%H:%M").to_string(),
            window.end.format("%H:%M").to_string(),
        )
    });
    vec![
        Cell::new(label).add_attribute(Attribute::Bold),
        Cell::new(plan.state).fg(match plan.state {
            PlanState::PlugIn => Color::Green,
            PlanState::NoNeed => Color::DarkGrey,
            PlanState::NoData => Color::DarkYellow,
            PlanState::AtRisk => Color::Red,
        }),
        Cell::new(date).add_attribute(Attribute::Dim),
        Cell::new(start),
        Cell::new(end).add_attribute(Attribute::Dim),
        Cell::new(plan.duration_hours).set_alignment(CellAlignment::Right),
        Cell::new(&plan.reason),
    ]
}

pub fn build_metrics_table(outputs: &PlannerOutputs) -> Table {
    let metrics = &outputs.metrics;
    let mut table = new_table();
    table.set_header(vec!["Needed", "Energy", "Hours", "Slots", "Planned", "Cost"]);
    table.add_row(vec![
        Cell::new(metrics.needed.soc).set_alignment(CellAlignment::Right),
        Cell::new(metrics.needed.energy).set_alignment(CellAlignment::Right),
        Cell::new(metrics.needed.hours).set_alignment(CellAlignment::Right),
        Cell::new(metrics.needed.n_slots).set_alignment(CellAlignment::Right),
        Cell::new(metrics.planned_slots).set_alignment(CellAlignment::Right),
        metrics.estimated_cost.map_or_else(
            || Cell::new("n/a").add_attribute(Attribute::Dim),
            |cost| Cell::new(cost.round_to_hundredths()).set_alignment(CellAlignment::Right),
        ),
    ]);
    table
}
