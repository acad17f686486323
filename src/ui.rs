//! TUI rendering for the provider selection client.
//!
//! This module handles all UI rendering using the `ratatui` crate: the
//! filter sidebar, the provider list with pagination, the radius map view,
//! the selected-provider detail panel, and the quick-rebook modal overlay.
//! Rendering is pure: everything is derived from [`App`] state.

use crate::app::{App, FilterRow, SearchState, Severity, ViewMode};
use crate::geo;
use crate::models::{Coordinate, Provider};
use crate::rebook::{RebookField, RebookForm};
use ratatui::{
    prelude::*,
    widgets::{canvas::*, *},
};

use ratatui::text::Line;

/// Renders one frame based on current application state.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(1), // Status line
        ])
        .split(f.size());

    render_header(f, app, chunks[0]);
    render_body(f, app, chunks[1]);
    render_status(f, app, chunks[2]);

    if app.profile_open && app.rebook.is_none() {
        render_profile_modal(f, app);
    }
    if app.rebook.is_some() {
        render_rebook_modal(f, app);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let user = app
        .session
        .user
        .as_ref()
        .map(|u| u.name.as_str())
        .unwrap_or("guest");
    let header = Line::from(vec![
        Span::styled(
            " Find a Provider ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            format!("{} providers", app.pagination.total),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  │  "),
        Span::styled(user, Style::default().fg(Color::Magenta)),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

/// Body: filter sidebar (22%), provider list (39%), map (39%) side by side.
fn render_body(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(39),
            Constraint::Percentage(39),
        ])
        .split(area);

    render_filters(f, app, chunks[0]);
    render_list_column(f, app, chunks[1]);
    render_map(f, app, chunks[2]);
}

fn render_filters(f: &mut Frame, app: &App, area: Rect) {
    let active = app.view_mode == ViewMode::Filters;
    let fl = &app.filters;

    let rows: Vec<(FilterRow, String, String)> = vec![
        (FilterRow::Sort, "Sort".into(), app.sort.label().to_string()),
        (
            FilterRow::RatingMin,
            "Min rating".into(),
            format!("{:.1}", fl.rating_min),
        ),
        (
            FilterRow::RatingMax,
            "Max rating".into(),
            format!("{:.1}", fl.rating_max),
        ),
        (
            FilterRow::MaxDistance,
            "Max distance".into(),
            format!("{:.0} km", fl.max_distance),
        ),
        (
            FilterRow::AvailabilityDays,
            "Available within".into(),
            format!("{} days", fl.availability_days),
        ),
        (
            FilterRow::PreviouslyHired,
            "Previously hired".into(),
            checkbox(fl.previously_hired_only),
        ),
        (
            FilterRow::FavoritesOnly,
            "Favorites only".into(),
            checkbox(fl.favorites_only),
        ),
        (
            FilterRow::VerifiedOnly,
            "Verified only".into(),
            checkbox(fl.verified_only),
        ),
    ];

    let items: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(i, (_, label, value))| {
            let style = if active && i == app.filter_cursor {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(30, 30, 60))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!(" {:<17}", label), style),
                Span::styled(value.clone(), style),
            ])
        })
        .collect();

    let border_style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = items;
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if active {
            " ←/→ adjust  c reset  Esc done"
        } else {
            " Tab to edit filters"
        },
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

fn checkbox(on: bool) -> String {
    if on { "[x]".to_string() } else { "[ ]".to_string() }
}

/// List column: provider cards, pagination footer, and the detail panel for
/// the selected provider.
fn render_list_column(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(9)])
        .split(area);

    render_provider_list(f, app, chunks[0]);
    render_detail(f, app, chunks[1]);
}

fn render_provider_list(f: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Providers — page {}/{} ",
        app.pagination.page,
        app.pagination.pages.max(1)
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    match app.search_state {
        SearchState::Idle | SearchState::Loading => {
            let msg = Paragraph::new("\n Finding the best providers for you...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(msg, area);
            return;
        }
        SearchState::Failed => {
            let msg = Paragraph::new("\n Could not load providers.\n Adjust filters or press 'g' to retry.")
                .style(Style::default().fg(Color::Red))
                .block(block);
            f.render_widget(msg, area);
            return;
        }
        SearchState::Success if app.providers.is_empty() => {
            let msg = Paragraph::new(
                "\n No providers found.\n Try adjusting your filters ('c' resets them).",
            )
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
            f.render_widget(msg, area);
            return;
        }
        SearchState::Success => {}
    }

    let items: Vec<ListItem> = app
        .providers
        .iter()
        .enumerate()
        .map(|(i, p)| provider_card(p, i == app.selected_index))
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

fn provider_card(p: &Provider, selected: bool) -> ListItem {
    let style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .bg(Color::Rgb(30, 30, 60))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut badges = String::new();
    if p.is_favorite {
        badges.push_str(" ♥");
    }
    if p.professional_badge {
        badges.push_str(" ✓");
    }
    if p.previously_hired {
        badges.push_str(" ↺");
    }

    let distance = p
        .distance_km
        .map(geo::format_distance)
        .unwrap_or_else(|| "distance n/a".to_string());
    let skills = if p.skills.is_empty() {
        "—".to_string()
    } else {
        p.skills
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(format!(" {}", p.name), style),
            Span::styled(badges, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled(format!("   {} {:.1}", stars(p.rating), p.rating), style),
            Span::styled(
                format!("  {} jobs  {}", p.total_jobs, distance),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            format!("   {}", skills),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn stars(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Detail panel for the selected provider, the list-side equivalent of the
/// map marker popup: identity, stats, and the two actions (profile, directions).
fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Selected Provider ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(p) = app.selected_provider() else {
        f.render_widget(block, area);
        return;
    };

    let distance = match (app.location, p.coordinates) {
        (Some(user), Some(coords)) => geo::format_distance(geo::distance_km(user, coords)),
        _ => p
            .distance_km
            .map(geo::format_distance)
            .unwrap_or_else(|| "distance n/a".to_string()),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name:   ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(&p.name, Style::default().fg(Color::Yellow)),
            Span::raw(if p.professional_badge { "  ✓ verified" } else { "" }),
        ]),
        Line::from(vec![
            Span::styled("Rating: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} {:.1}  |  {} jobs  |  {}", stars(p.rating), p.rating, p.total_jobs, distance)),
        ]),
        Line::from(vec![
            Span::styled("Skills: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(p.skills.join(", ")),
        ]),
    ];
    if let Some(url) = &p.profile_picture {
        lines.push(Line::from(vec![
            Span::styled("Photo:  ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(url.as_str(), Style::default().fg(Color::DarkGray)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " f favorite   r rebook   d directions",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Radius map. Two states: until a location resolves only the world view is
/// drawn; once located, the canvas is framed around the user with the
/// radius disc and the provider markers inside it.
fn render_map(f: &mut Frame, app: &App, area: Rect) {
    match app.location {
        Some(user) => render_located_map(f, app, user, area),
        None => render_world_map(f, app, area),
    }
}

fn render_world_map(f: &mut Frame, app: &App, area: Rect) {
    let note = if app.location_resolved {
        " Map — location unavailable "
    } else {
        " Map — locating... "
    };
    let canvas = Canvas::default()
        .block(Block::bordered().title(note))
        .marker(symbols::Marker::Braille)
        .x_bounds([-180.0, 180.0])
        .y_bounds([-90.0, 90.0])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(50, 50, 50),
                resolution: MapResolution::High,
            });
        });
    f.render_widget(canvas, area);
}

fn render_located_map(f: &mut Frame, app: &App, user: Coordinate, area: Rect) {
    let radius = app.radius_km;
    let zoom = geo::zoom_from_radius(radius);
    let (lat_span, lon_span) = geo::canvas_span(user, radius);

    let in_radius: Vec<&Provider> = app
        .providers
        .iter()
        .filter(|p| match p.coordinates {
            Some(c) => geo::distance_km(user, c) <= radius,
            None => false,
        })
        .collect();

    let title = format!(
        " Map — {:.0}km radius, zoom {} ({} in range)  +/- adjust ",
        radius,
        zoom,
        in_radius.len()
    );

    let selected_id = app.selected_provider().map(|p| p.id.as_str());

    let canvas = Canvas::default()
        .block(Block::bordered().title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds([user.longitude - lon_span, user.longitude + lon_span])
        .y_bounds([user.latitude - lat_span, user.latitude + lat_span])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(50, 50, 50),
                resolution: MapResolution::High,
            });

            // Radius disc, drawn in latitude degrees.
            ctx.draw(&Circle {
                x: user.longitude,
                y: user.latitude,
                radius: radius / 111.0,
                color: Color::Rgb(249, 115, 22),
            });

            for p in &in_radius {
                let Some(c) = p.coordinates else { continue };
                if selected_id == Some(p.id.as_str()) {
                    ctx.print(
                        c.longitude,
                        c.latitude,
                        Line::from(vec![
                            Span::styled(
                                " ● ",
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                format!(" {} ", p.name),
                                Style::default().fg(Color::Black).bg(Color::Yellow),
                            ),
                        ]),
                    );
                } else {
                    ctx.print(c.longitude, c.latitude, "·");
                }
            }

            // User marker on top.
            ctx.print(
                user.longitude,
                user.latitude,
                Line::from(Span::styled(" ⌖ ", Style::default().fg(Color::Cyan))),
            );
        });

    f.render_widget(canvas, area);
}

/// Status line: active notification, otherwise key help.
fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.notification {
        Some(n) => {
            let color = match n.severity {
                Severity::Info => Color::Green,
                Severity::Warn => Color::Yellow,
                Severity::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {}", n.message),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            " j/k select  ←/→ page  s sort  f favorite  r rebook  d directions  Tab filters  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Full profile view for the selected provider, the "view profile" action
/// from the marker popup.
fn render_profile_modal(f: &mut Frame, app: &App) {
    let Some(p) = app.selected_provider() else { return };

    let area = centered_rect(60, 16, f.size());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", p.name))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut badges: Vec<&str> = Vec::new();
    if p.professional_badge {
        badges.push("✓ verified");
    }
    if p.previously_hired {
        badges.push("↺ previously hired");
    }
    if p.is_favorite {
        badges.push("♥ favorite");
    }

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Rating:   ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} {:.1} ({} jobs)", stars(p.rating), p.rating, p.total_jobs)),
        ]),
        Line::from(vec![
            Span::styled("Skills:   ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(if p.skills.is_empty() {
                "—".to_string()
            } else {
                p.skills.join(", ")
            }),
        ]),
    ];
    if !badges.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Badges:   ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(badges.join("  "), Style::default().fg(Color::Yellow)),
        ]));
    }
    if let (Some(user), Some(coords)) = (app.location, p.coordinates) {
        lines.push(Line::from(vec![
            Span::styled("Distance: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(geo::format_distance(geo::distance_km(user, coords))),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Route:    ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                geo::directions_url(user, coords),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    if let Some(url) = &p.profile_picture {
        lines.push(Line::from(vec![
            Span::styled("Photo:    ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(url.as_str(), Style::default().fg(Color::DarkGray)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " f favorite   r rebook   d directions   Esc close",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_rebook_modal(f: &mut Frame, app: &App) {
    let Some(form) = &app.rebook else { return };

    let area = centered_rect(56, 20, f.size());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" Quick Rebook — {} ", form.provider_name))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    match (&form.previous, form.loading_previous) {
        (_, true) => lines.push(Line::from(Span::styled(
            " Looking up your last booking...",
            Style::default().fg(Color::DarkGray),
        ))),
        (Some(prev), false) => {
            let service = prev.service_name.as_deref().unwrap_or("previous service");
            let rating = prev.rating.map(|r| format!("{}/5", r)).unwrap_or_else(|| "—".to_string());
            lines.push(Line::from(vec![
                Span::styled(" Last booking: ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{} (rated {})", service, rating)),
            ]));
        }
        (None, false) => lines.push(Line::from(Span::styled(
            " First booking with this provider.",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    lines.push(Line::from(""));

    for (field, value) in [
        (RebookField::Date, &form.date),
        (RebookField::Time, &form.time),
        (RebookField::Address, &form.address),
        (RebookField::Notes, &form.notes),
    ] {
        lines.push(field_line(form, field, value));
    }

    lines.push(Line::from(""));
    if let Some((_, message)) = &form.field_error {
        lines.push(Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Red),
        )));
    } else if form.submitting {
        lines.push(Line::from(Span::styled(
            " Creating booking...",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Tab next field   Enter submit   Esc cancel",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn field_line<'a>(form: &'a RebookForm, field: RebookField, value: &'a str) -> Line<'a> {
    let focused = form.focused == field;
    let errored = matches!(&form.field_error, Some((f, _)) if *f == field);
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if errored {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let cursor = if focused { "█" } else { "" };
    Line::from(vec![
        Span::styled(format!(" {:<19}", field.label()), label_style),
        Span::raw(value),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
