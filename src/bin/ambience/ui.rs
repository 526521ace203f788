//! Mixer view: master level, one row per sound, help bar

use ambience::{catalog::SoundCategory, dsp::gain::level_to_percent, CATALOG};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::App;

/// Width of the volume bars in cells
const BAR_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Master
            Constraint::Min(CATALOG.len() as u16 + 2), // Sounds
            Constraint::Length(1), // Status / help
        ])
        .split(frame.area());

    let master = app.mixer.master_volume();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" Master ", Style::default().fg(Color::Cyan)),
        Span::raw(bar(master)),
        Span::raw(format!(" {:>3}%", level_to_percent(master))),
        Span::styled(
            match app.mixer.sample_rate() {
                Some(_) if app.mixer.is_suspended() => "   paused".to_string(),
                Some(rate) => format!("   {:.1}kHz", rate as f32 / 1000.0),
                None => "   output idle".to_string(),
            },
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().title(" ambience ").borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let rows: Vec<Line> = CATALOG
        .iter()
        .enumerate()
        .map(|(i, sound)| {
            let playing = app.mixer.is_playing(sound.id);
            let volume = app.mixer.current_volume(sound.id);

            let mut name_style = Style::default().fg(if playing { Color::Green } else { Color::White });
            if i == app.selected {
                name_style = name_style.add_modifier(Modifier::REVERSED);
            }

            Line::from(vec![
                Span::raw(if playing { " ▶ " } else { "   " }),
                Span::styled(format!("{:<16}", sound.name), name_style),
                Span::styled(
                    format!("{:<8}", category_label(sound.category)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(bar(volume)),
                Span::raw(format!(" {:>3}%", level_to_percent(volume))),
            ])
        })
        .collect();
    let sounds = Paragraph::new(rows).block(Block::default().title(" Sounds ").borders(Borders::ALL));
    frame.render_widget(sounds, chunks[1]);

    let footer = match &app.status {
        Some(message) => Paragraph::new(format!(" {message}")).style(Style::default().fg(Color::Red)),
        None => Paragraph::new(
            " [↑↓] Select  [Space] Play/Stop  [←→] Volume  [-/+] Master  [P] Pause  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, chunks[2]);
}

fn bar(level: f32) -> String {
    let filled = (level * BAR_WIDTH as f32).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn category_label(category: SoundCategory) -> &'static str {
    match category {
        SoundCategory::Nature => "nature",
        SoundCategory::Noise => "noise",
        SoundCategory::Cozy => "cozy",
    }
}
