use crawlboard_core::{
    Alert, AlertSeverity, AppViewModel, CardAction, ChannelStatus, FormField, JobCard,
    JobListArea, ProgressSection, RecordsBody, RecordsModal, StatsPanel,
};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::console::{Console, NOTICE_LIMIT};
use super::input::USAGE;

const BAR_WIDTH: usize = 20;
const PROMPT: &str = "> ";
// Top border, form line, confirmation line, notices.
const FOOTER_HEIGHT: u16 = 3 + NOTICE_LIMIT as u16;

/// Draws the whole dashboard into one frame.
pub fn draw(frame: &mut Frame<'_>, view: &AppViewModel, console: &Console) {
    let [header, jobs, footer, command] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(FOOTER_HEIGHT),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(header_lines(view)).block(Block::default().borders(Borders::BOTTOM)),
        header,
    );
    frame.render_widget(
        Paragraph::new(job_lines(&view.page.jobs)).scroll((console.scroll(), 0)),
        jobs,
    );
    frame.render_widget(
        Paragraph::new(footer_lines(view, console)).block(Block::default().borders(Borders::TOP)),
        footer,
    );
    draw_command_line(frame, command, console.line());

    if let Some(modal) = &view.page.modal {
        draw_records(frame, jobs, modal);
    }
    if console.help_visible() {
        let popup = popup_area(frame.area(), 0.8, 0.6);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(USAGE).block(
                Block::default()
                    .title("help (Esc to close)")
                    .borders(Borders::ALL),
            ),
            popup,
        );
    }
}

fn header_lines(view: &AppViewModel) -> Vec<Line<'static>> {
    let title = Line::from(vec![
        Span::styled(
            format!("Crawl jobs ({})", view.job_count),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   live: "),
        Span::styled(channel_label(view.channel), channel_style(view.channel)),
    ]);
    let stats = match &view.page.stats {
        Some(stats) => stats_line(stats),
        None => "Stats: -".to_string(),
    };
    vec![title, Line::from(stats)]
}

fn channel_label(status: ChannelStatus) -> &'static str {
    match status {
        ChannelStatus::Connecting => "connecting",
        ChannelStatus::Live => "on",
        ChannelStatus::Reconnecting => "reconnecting",
        ChannelStatus::Closed => "off",
    }
}

fn channel_style(status: ChannelStatus) -> Style {
    match status {
        ChannelStatus::Live => Style::default().fg(Color::Green),
        ChannelStatus::Connecting | ChannelStatus::Reconnecting => {
            Style::default().fg(Color::Yellow)
        }
        ChannelStatus::Closed => Style::default().fg(Color::DarkGray),
    }
}

fn stats_line(stats: &StatsPanel) -> String {
    format!(
        "Jobs: {} | Running: {} | Completed: {} | Pending: {} | Failed: {} | Records: {}",
        stats.total_jobs,
        stats.running_jobs,
        stats.completed_jobs,
        stats.pending_jobs,
        stats.failed_jobs,
        stats.total_records
    )
}

fn job_lines(jobs: &JobListArea) -> Vec<Line<'static>> {
    match jobs {
        JobListArea::Loading => vec![Line::from("Loading jobs...")],
        JobListArea::Placeholder(text) => vec![Line::styled(
            text.clone(),
            Style::default().fg(Color::DarkGray),
        )],
        JobListArea::Failed(text) => {
            vec![Line::styled(text.clone(), Style::default().fg(Color::Red))]
        }
        JobListArea::Cards(cards) => {
            let mut lines = Vec::new();
            for card in cards {
                if !lines.is_empty() {
                    lines.push(Line::default());
                }
                lines.extend(card_lines(card));
            }
            lines
        }
    }
}

fn card_lines(card: &JobCard) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("#{} {}", card.job_id, card.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(card.badge.text.clone(), badge_style(&card.badge.class)),
        ]),
        Line::from(format!(
            "    {} | {} | records {} | created {}",
            card.date_range, card.location, card.records, card.created_at
        )),
    ];
    if let Some(progress) = &card.progress {
        lines.push(Line::from(format!("    {}", progress_bar(progress))));
    }
    if let Some(error) = &card.error {
        lines.push(Line::styled(
            format!("    error: {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    let actions: Vec<String> = card
        .actions
        .iter()
        .map(|action| format!("{} {}", action_command(*action), card.job_id))
        .collect();
    lines.push(Line::styled(
        format!("    > {}", actions.join(" | ")),
        Style::default().fg(Color::DarkGray),
    ));
    lines
}

fn badge_style(class: &str) -> Style {
    let color = match class {
        "status-pending" => Color::Yellow,
        "status-running" => Color::Cyan,
        "status-completed" => Color::Green,
        "status-failed" => Color::Red,
        "status-cancelled" => Color::DarkGray,
        _ => return Style::default(),
    };
    Style::default().fg(color)
}

fn progress_bar(progress: &ProgressSection) -> String {
    let filled = usize::from(progress.fill_width) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {}  {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        progress.fill_label,
        progress.info
    )
}

fn action_command(action: CardAction) -> &'static str {
    match action {
        CardAction::Start => "start",
        CardAction::Cancel => "cancel",
        CardAction::Records => "records",
        CardAction::Delete => "delete",
    }
}

fn footer_lines(view: &AppViewModel, console: &Console) -> Vec<Line<'static>> {
    let form: Vec<String> = FormField::ALL
        .iter()
        .map(|field| format!("{}={}", field.key(), view.form.get(*field)))
        .collect();
    let mut lines = vec![Line::from(format!("New job: {}", form.join(" ")))];
    if let Some(confirmation) = &view.confirmation {
        lines.push(Line::styled(
            confirmation.prompt(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    lines.extend(console.notices().map(alert_line));
    lines
}

fn alert_line(alert: &Alert) -> Line<'static> {
    match alert.severity {
        AlertSeverity::Info => {
            Line::styled(format!("** {}", alert.text), Style::default().fg(Color::Green))
        }
        AlertSeverity::Error => {
            Line::styled(format!("!! {}", alert.text), Style::default().fg(Color::Red))
        }
    }
}

fn draw_command_line(frame: &mut Frame<'_>, area: Rect, line: &str) {
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(PROMPT, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(line.to_string()),
        ])),
        area,
    );
    let typed = u16::try_from(PROMPT.len() + line.chars().count()).unwrap_or(u16::MAX);
    let column = area
        .x
        .saturating_add(typed)
        .min(area.right().saturating_sub(1));
    frame.set_cursor_position((column, area.y));
}

fn draw_records(frame: &mut Frame<'_>, anchor: Rect, modal: &RecordsModal) {
    let content = match &modal.body {
        RecordsBody::Placeholder(text) => Text::from(text.clone()),
        RecordsBody::Rows(rows) => Text::from(
            rows.iter()
                .map(|row| {
                    Line::from(format!(
                        "{} | {} | {} | {} | {} | {} | {}",
                        row.request_number,
                        row.applicant_name,
                        row.license_title,
                        row.organization,
                        row.location,
                        row.status,
                        row.responded_at
                    ))
                })
                .collect::<Vec<_>>(),
        ),
    };
    let popup = popup_area(anchor, 0.9, 0.86);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(format!("records of job #{} (Esc to close)", modal.job_id))
                    .borders(Borders::ALL),
            ),
        popup,
    );
}

/// Centered share of `anchor`. Small anchors are used whole.
fn popup_area(anchor: Rect, width_share: f32, height_share: f32) -> Rect {
    if anchor.width < 40 || anchor.height < 8 {
        return anchor;
    }
    let width = ((anchor.width as f32) * width_share).round() as u16;
    let height = ((anchor.height as f32) * height_share).round() as u16;
    let width = width.clamp(40, anchor.width);
    let height = height.clamp(8, anchor.height);
    Rect {
        x: anchor.x + (anchor.width - width) / 2,
        y: anchor.y + (anchor.height - height) / 2,
        width,
        height,
    }
}
