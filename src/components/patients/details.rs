//! Detail view for a single patient, opened from the list by ID.

use crate::app::AppAction;
use crate::components::{render_title, Component, BORDER, MUTED, PANEL, TEXT};
use crate::models::{gender_label, Patient, WEEKDAYS};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};

/// Missed doses listed before the rest are summarised as a count.
const MISSED_DOSES_SHOWN: usize = 6;

pub struct PatientDetails {
    id: String,
    /// `None` when the ID no longer resolves, e.g. after a refetch.
    patient: Option<Patient>,
}

impl PatientDetails {
    pub fn new(id: String, patient: Option<Patient>) -> Self {
        Self { id, patient }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Re-resolves the patient after the collection was replaced.
    pub fn refresh(&mut self, patient: Option<Patient>) {
        self.patient = patient;
    }
}

impl Component for PatientDetails {
    fn handle_input(&mut self, key: KeyEvent) -> Result<Option<AppAction>> {
        Ok(match key.code {
            KeyCode::Esc
            | KeyCode::Enter
            | KeyCode::Backspace
            | KeyCode::Char('b')
            | KeyCode::Char('B') => Some(AppAction::BackToList),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(AppAction::Refresh),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(16),   // Content area
                Constraint::Length(1), // Back button
                Constraint::Length(1), // Help text
            ])
            .margin(1)
            .split(frame.area());

        render_title(frame, layout[0], "👤 PATIENT DETAILS");

        match &self.patient {
            Some(patient) => render_patient(frame, layout[1], patient),
            None => {
                let message = format!("Patient {} was not found. It may have been reassigned.", self.id);
                frame.render_widget(
                    Paragraph::new(message)
                        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                        .alignment(Alignment::Center)
                        .block(section(" Not Found ")),
                    layout[1],
                );
            }
        }

        let back_button = Paragraph::new("► Back ◄")
            .style(
                Style::default()
                    .fg(Color::Rgb(129, 199, 245))
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        frame.render_widget(back_button, layout[2]);

        frame.render_widget(
            Paragraph::new("Enter/Esc/Backspace: Return to list | R: Refresh")
                .style(Style::default().fg(MUTED))
                .alignment(Alignment::Center),
            layout[3],
        );
    }
}

fn section(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(title, Style::default().fg(Color::Cyan)))
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(PANEL))
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn render_patient(frame: &mut Frame, area: Rect, patient: &Patient) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(3),
        ])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(5)])
        .split(columns[1]);

    let basic = vec![
        format!("  ID: {}", patient.id),
        format!("  Name: {}", or_dash(&patient.name)),
        format!(
            "  Age: {}  Gender: {}",
            patient.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            patient.gender.as_deref().map(gender_label).unwrap_or("-")
        ),
        format!("  Contact: {}", or_dash(&patient.contact)),
    ];
    render_lines(frame, left[0], " Basic Information ", basic);

    let care = vec![
        format!("  Doctor: {}", or_dash(&patient.doctor_name)),
        format!("  Caretaker: {}", or_dash(&patient.caretaker_name)),
        format!(
            "  Next of kin: {} ({})",
            or_dash(&patient.kin_name),
            or_dash(&patient.kin_contact)
        ),
    ];
    render_lines(frame, left[1], " Care Team ", care);
    render_lines(frame, left[2], " INR History ", inr_history_lines(patient));

    let therapy = vec![
        format!("  Therapy: {}", or_dash(&patient.therapy)),
        format!("  Started: {}", or_dash(&patient.therapy_start_date)),
        format!(
            "  Target INR: {}",
            patient
                .target_inr
                .map(|range| range.to_string())
                .unwrap_or_else(|| "-".into())
        ),
        format!(
            "  Latest INR: {} on {}",
            patient
                .latest_inr
                .map(|inr| format!("{inr:.1}"))
                .unwrap_or_else(|| "-".into()),
            or_dash(&patient.latest_inr_date)
        ),
        format!("  History: {}", or_dash(&patient.medical_history)),
    ];
    render_lines(frame, right[0], " Therapy ", therapy);

    let mut dosage = vec![prescription_line(patient)];
    dosage.push(String::new());
    if patient.missed_doses.is_empty() {
        dosage.push("  No missed doses".to_string());
    } else {
        dosage.push(format!("  Missed doses ({}):", patient.missed_doses.len()));
        let shown: Vec<&str> = patient
            .missed_doses
            .iter()
            .take(MISSED_DOSES_SHOWN)
            .map(String::as_str)
            .collect();
        let mut line = format!("  {}", shown.join(", "));
        if patient.missed_doses.len() > MISSED_DOSES_SHOWN {
            line.push_str(&format!(
                " and {} more",
                patient.missed_doses.len() - MISSED_DOSES_SHOWN
            ));
        }
        dosage.push(line);
    }
    render_lines(frame, right[1], " Dosage ", dosage);
}

/// One line per report, newest first. Only the date part of a timestamp is shown.
fn inr_history_lines(patient: &Patient) -> Vec<String> {
    if patient.inr_reports.is_empty() {
        return vec!["  No INR reports".to_string()];
    }
    patient
        .inr_reports
        .iter()
        .map(|report| {
            let date = report
                .date
                .as_deref()
                .and_then(|date| date.split('T').next())
                .unwrap_or("-");
            format!("  {date}  INR {:.1}", report.value)
        })
        .collect()
}

/// Weekly prescription in weekday order, e.g. `MON 4.0 mg | TUE 4.0 mg`.
fn prescription_line(patient: &Patient) -> String {
    if patient.prescription.is_empty() {
        return "  No prescription on record".to_string();
    }
    let days: Vec<String> = WEEKDAYS
        .iter()
        .filter_map(|day| {
            patient
                .prescription
                .get(*day)
                .map(|dose| format!("{day} {dose}"))
        })
        .collect();
    format!("  {}", days.join(" | "))
}

fn render_lines(frame: &mut Frame, area: Rect, title: &str, lines: Vec<String>) {
    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(TEXT))
            .block(section(title))
            .wrap(Wrap { trim: false }),
        area,
    );
}
