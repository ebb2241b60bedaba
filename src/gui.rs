use iced::{
    Element, Length, Task, Color, Alignment, Border,
};
use iced::widget::{
    Column, Row, Container, Text, Button, TextInput, Scrollable, Space, rule,
};

use crate::analytics::Analytics;
use crate::client::FeedbackClient;
use crate::models::{now_timestamp, FeedbackRecord, FeedbackSubmission, Rating};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use tracing::{info, warn};

pub const INCOMPLETE_FORM: &str = "Please fill all fields and select a rating";
pub const SUBMIT_FAILED: &str = "Failed to submit feedback. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone)]
pub enum Message {
    FeedbacksLoaded(Result<Vec<FeedbackRecord>, String>),
    NameChanged(String),
    EmailChanged(String),
    MessageChanged(String),
    RatingSelected(u8),
    Submit,
    Submitted(Result<FeedbackRecord, String>),
    Refresh,
    ToggleTheme,
}

/// Unsent form contents. A rating of 0 means no star picked yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    pub message: String,
    pub rating: u8,
}

impl FeedbackForm {
    /// Quick check before hitting the network; the server validates again.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.message.is_empty() && self.rating != 0
    }

    pub fn to_submission(&self, created_at: String) -> FeedbackSubmission {
        FeedbackSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
            rating: self.rating,
            created_at: Some(created_at),
        }
    }

    pub fn clear(&mut self) {
        *self = FeedbackForm::default();
    }
}

pub struct FeedbackHubApp {
    client: FeedbackClient,

    // UI state
    loading: bool,
    load_error: Option<String>,
    form: FeedbackForm,
    form_error: String,
    is_submitting: bool,
    theme: Theme,

    feedbacks: Vec<FeedbackRecord>,
}

impl FeedbackHubApp {
    pub fn new(client: FeedbackClient) -> (Self, Task<Message>) {
        let mut app = FeedbackHubApp {
            client,
            loading: true,
            load_error: None,
            form: FeedbackForm::default(),
            form_error: String::new(),
            is_submitting: false,
            theme: Theme::Light,
            feedbacks: Vec::new(),
        };
        let task = app.reload();
        (app, task)
    }

    fn reload(&mut self) -> Task<Message> {
        self.loading = true;
        let client = self.client.clone();
        Task::perform(async move {
            client.list().await.map_err(|e| e.to_string())
        }, Message::FeedbacksLoaded)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FeedbacksLoaded(Ok(list)) => {
                info!("loaded {} feedbacks from {}", list.len(), self.client.base_url());
                self.loading = false;
                self.load_error = None;
                self.feedbacks = list;
            }
            Message::FeedbacksLoaded(Err(e)) => {
                warn!("error fetching feedbacks: {e}");
                self.loading = false;
                self.load_error = Some(format!("Could not load feedbacks: {e}"));
                self.feedbacks.clear();
            }
            Message::NameChanged(s) => self.form.name = s,
            Message::EmailChanged(s) => self.form.email = s,
            Message::MessageChanged(s) => self.form.message = s,
            Message::RatingSelected(r) => self.form.rating = r,
            Message::Submit => {
                self.form_error.clear();
                if !self.form.is_complete() {
                    self.form_error = INCOMPLETE_FORM.to_string();
                    return Task::none();
                }
                if self.is_submitting {
                    return Task::none();
                }
                self.is_submitting = true;
                let client = self.client.clone();
                let submission = self.form.to_submission(now_timestamp());
                return Task::perform(async move {
                    client.create(&submission).await.map_err(|e| e.to_string())
                }, Message::Submitted);
            }
            Message::Submitted(Ok(rec)) => {
                info!("feedback #{} submitted", rec.id);
                self.is_submitting = false;
                self.form.clear();
                return self.reload();
            }
            Message::Submitted(Err(e)) => {
                warn!("error creating feedback: {e}");
                self.is_submitting = false;
                self.form_error = SUBMIT_FAILED.to_string();
            }
            Message::Refresh => {
                if !self.loading {
                    return self.reload();
                }
            }
            Message::ToggleTheme => {
                self.theme = match self.theme {
                    Theme::Light => Theme::Dark,
                    Theme::Dark => Theme::Light,
                };
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut page = Column::new()
            .padding(30)
            .spacing(25)
            .width(Length::Fill)
            .push(self.view_header())
            .push(rule::Rule::horizontal(1));

        if self.loading {
            let secondary_text = self.secondary_text_color();
            page = page.push(
                Container::new(
                    Text::new("Loading feedbacks...")
                        .size(20)
                        .style(move |_theme| {
                            iced::widget::text::Style {
                                color: Some(secondary_text),
                            }
                        })
                )
                .padding(60)
                .center_x(Length::Fill)
            );
        } else {
            if let Some(err) = &self.load_error {
                page = page.push(
                    Text::new(err)
                        .size(14)
                        .style(|_theme| {
                            iced::widget::text::Style {
                                color: Some(Color::from_rgb(0.9, 0.2, 0.2)),
                            }
                        })
                );
            }

            let main = Row::new()
                .spacing(25)
                .push(self.view_form())
                .push(self.view_table());

            page = page
                .push(self.view_analytics())
                .push(main);
        }

        let bg_color = self.bg_color();
        Container::new(Scrollable::new(page))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(bg_color)),
                    border: Border::default(),
                    ..Default::default()
                }
            })
            .into()
    }

    fn view_header(&self) -> Element<'_, Message> {
        let accent = self.accent_color();
        let secondary_text = self.secondary_text_color();

        let titles = Column::new()
            .spacing(6)
            .push(
                Text::new("Feedback Hub")
                    .size(32)
                    .style(move |_theme| {
                        iced::widget::text::Style {
                            color: Some(accent),
                        }
                    })
            )
            .push(
                Text::new("We value your thoughts and experiences")
                    .size(14)
                    .style(move |_theme| {
                        iced::widget::text::Style {
                            color: Some(secondary_text),
                        }
                    })
            );

        let theme_btn = Button::new(
            Text::new(match self.theme {
                Theme::Light => "🌙 Dark Mode",
                Theme::Dark => "☀️ Light Mode",
            })
                .size(14)
        )
        .on_press(Message::ToggleTheme)
        .padding(10);

        let refresh_btn = Button::new(Text::new("⟳ Refresh").size(14))
            .on_press_maybe((!self.loading).then_some(Message::Refresh))
            .padding(10);

        Row::new()
            .spacing(10)
            .align_y(Alignment::Center)
            .push(titles)
            .push(Space::with_width(Length::Fill))
            .push(refresh_btn)
            .push(theme_btn)
            .into()
    }

    fn view_analytics(&self) -> Element<'_, Message> {
        let analytics = Analytics::from_records(&self.feedbacks);

        Row::new()
            .spacing(20)
            .push(self.analytics_card("Total Feedbacks", analytics.total, None, Color::from_rgb(1.0, 0.42, 0.21)))
            .push(self.analytics_card(
                "Average Rating",
                analytics.avg_rating_display(),
                Some("out of 5.0"),
                Color::from_rgb(0.97, 0.72, 0.19),
            ))
            .push(self.analytics_card(
                "Positive Feedback",
                analytics.positive,
                Some("Rating ≥ 4"),
                Color::from_rgb(0.0, 0.72, 0.58),
            ))
            .push(self.analytics_card(
                "Needs Improvement",
                analytics.negative,
                Some("Rating < 3"),
                Color::from_rgb(0.99, 0.47, 0.66),
            ))
            .into()
    }

    fn analytics_card(
        &self,
        title: &'static str,
        value: impl Display,
        subtitle: Option<&'static str>,
        color: Color,
    ) -> Element<'_, Message> {
        let text_color = self.text_color();
        let secondary_text = self.secondary_text_color();
        let container_bg = self.container_bg_color();

        let mut content = Column::new()
            .spacing(4)
            .push(
                Text::new(value.to_string())
                    .size(30)
                    .style(move |_theme| {
                        iced::widget::text::Style {
                            color: Some(text_color),
                        }
                    })
            )
            .push(Text::new(title).size(14).style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(secondary_text),
                }
            }));

        if let Some(sub) = subtitle {
            content = content.push(Text::new(sub).size(12).style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(secondary_text),
                }
            }));
        }

        Container::new(content)
            .padding(18)
            .width(Length::Fill)
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(container_bg)),
                    border: Border {
                        color,
                        width: 2.0,
                        radius: 6.0.into(),
                    },
                    ..Default::default()
                }
            })
            .into()
    }

    fn view_form(&self) -> Element<'_, Message> {
        let text_color = self.text_color();
        let secondary_text = self.secondary_text_color();

        let label = move |s: &'static str| {
            Text::new(s).size(14).style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(secondary_text),
                }
            })
        };

        let title = Text::new("Share Your Feedback")
            .size(22)
            .style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(text_color),
                }
            });

        let mut form = Column::new()
            .spacing(12)
            .width(Length::Fixed(380.0))
            .push(title);

        if !self.form_error.is_empty() {
            form = form.push(
                Text::new(&self.form_error)
                    .size(14)
                    .style(|_theme| {
                        iced::widget::text::Style {
                            color: Some(Color::from_rgb(0.9, 0.2, 0.2)),
                        }
                    })
            );
        }

        let submit_label = if self.is_submitting { "Submitting..." } else { "Submit Feedback" };
        let submit_btn = Button::new(Text::new(submit_label).size(16))
            .on_press_maybe((!self.is_submitting).then_some(Message::Submit))
            .padding(14)
            .width(Length::Fill);

        form.push(label("Full Name"))
            .push(
                TextInput::new("Enter your name", &self.form.name)
                    .on_input(Message::NameChanged)
                    .padding(12)
                    .size(16)
            )
            .push(label("Email Address"))
            .push(
                TextInput::new("your.email@example.com", &self.form.email)
                    .on_input(Message::EmailChanged)
                    .padding(12)
                    .size(16)
            )
            .push(label("Your Message"))
            .push(
                TextInput::new("Tell us about your experience...", &self.form.message)
                    .on_input(Message::MessageChanged)
                    .padding(12)
                    .size(16)
            )
            .push(label("Rate Your Experience"))
            .push(self.star_picker())
            .push(Space::with_height(10))
            .push(submit_btn)
            .into()
    }

    fn star_picker(&self) -> Element<'_, Message> {
        let mut row = Row::new().spacing(4);
        for star in Rating::all().map(Rating::get) {
            let color = self.star_color(star <= self.form.rating);
            row = row.push(
                Button::new(
                    Text::new(if star <= self.form.rating { "★" } else { "☆" })
                        .size(24)
                        .style(move |_theme| {
                            iced::widget::text::Style {
                                color: Some(color),
                            }
                        })
                )
                .on_press(Message::RatingSelected(star))
                .padding(4)
                .style(|_theme, _status| iced::widget::button::Style::default())
            );
        }
        row.into()
    }

    fn view_table(&self) -> Element<'_, Message> {
        let text_color = self.text_color();
        let secondary_text = self.secondary_text_color();
        let container_bg = self.container_bg_color();
        let border_color = self.border_color();

        let header_cell = move |s: &'static str, portion: u16| {
            Text::new(s)
                .size(13)
                .width(Length::FillPortion(portion))
                .style(move |_theme| {
                    iced::widget::text::Style {
                        color: Some(secondary_text),
                    }
                })
        };

        let header = Row::new()
            .spacing(10)
            .push(header_cell("Name", 2))
            .push(header_cell("Email", 3))
            .push(header_cell("Rating", 2))
            .push(header_cell("Message", 4))
            .push(header_cell("Date", 3));

        let mut rows = Column::new().spacing(8);
        if self.feedbacks.is_empty() {
            rows = rows.push(
                Container::new(
                    Text::new("No feedbacks yet")
                        .size(14)
                        .style(move |_theme| {
                            iced::widget::text::Style {
                                color: Some(secondary_text),
                            }
                        })
                )
                .padding(20)
                .center_x(Length::Fill)
            );
        }
        for (i, f) in self.feedbacks.iter().enumerate() {
            let star_color = self.star_color(true);
            let cell = move |s: String, portion: u16| {
                Text::new(s)
                    .size(13)
                    .width(Length::FillPortion(portion))
                    .style(move |_theme| {
                        iced::widget::text::Style {
                            color: Some(text_color),
                        }
                    })
            };
            rows = rows.push(
                Row::new()
                    .spacing(10)
                    .push(cell(f.name.clone(), 2))
                    .push(cell(f.email.clone(), 3))
                    .push(
                        Text::new(stars(f.rating))
                            .size(13)
                            .width(Length::FillPortion(2))
                            .style(move |_theme| {
                                iced::widget::text::Style {
                                    color: Some(star_color),
                                }
                            })
                    )
                    .push(cell(f.message.clone(), 4))
                    .push(cell(format_created_at(&f.created_at), 3))
            );
            if i + 1 < self.feedbacks.len() {
                rows = rows.push(rule::Rule::horizontal(1));
            }
        }

        let title = Text::new("All Feedbacks")
            .size(22)
            .style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(text_color),
                }
            });

        let table = Column::new()
            .spacing(12)
            .push(header)
            .push(rule::Rule::horizontal(1))
            .push(rows);

        Column::new()
            .spacing(12)
            .width(Length::Fill)
            .push(title)
            .push(
                Container::new(table)
                    .padding(15)
                    .width(Length::Fill)
                    .style(move |_theme| {
                        iced::widget::container::Style {
                            background: Some(iced::Background::Color(container_bg)),
                            border: Border {
                                color: border_color,
                                width: 1.0,
                                radius: 4.0.into(),
                            },
                            ..Default::default()
                        }
                    })
            )
            .into()
    }

    // Theme color helpers
    fn bg_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.98, 0.97, 0.96),
            Theme::Dark => Color::from_rgb(0.11, 0.11, 0.13),
        }
    }

    fn text_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.18, 0.2, 0.21),
            Theme::Dark => Color::from_rgb(0.9, 0.9, 0.9),
        }
    }

    fn secondary_text_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.39, 0.43, 0.45),
            Theme::Dark => Color::from_rgb(0.6, 0.6, 0.6),
        }
    }

    fn container_bg_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::WHITE,
            Theme::Dark => Color::from_rgb(0.17, 0.17, 0.19),
        }
    }

    fn border_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.87, 0.87, 0.87),
            Theme::Dark => Color::from_rgb(0.3, 0.3, 0.32),
        }
    }

    fn star_color(&self, filled: bool) -> Color {
        if filled {
            self.accent_color()
        } else {
            self.border_color()
        }
    }

    fn accent_color(&self) -> Color {
        Color::from_rgb(1.0, 0.42, 0.21)
    }
}

/// `★★★☆☆` for a rating of 3.
pub fn stars(rating: u8) -> String {
    let filled = rating.min(Rating::MAX) as usize;
    let empty = Rating::MAX as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

/// Timestamp for the table, in local time. Unparseable values are shown as stored.
pub fn format_created_at(raw: &str) -> String {
    format_created_at_in(raw, &Local)
}

fn format_created_at_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(tz).format("%b %-d, %Y, %I:%M %p").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn app() -> FeedbackHubApp {
        let (app, _task) = FeedbackHubApp::new(FeedbackClient::new("http://127.0.0.1:9"));
        app
    }

    fn record(id: u64, rating: u8) -> FeedbackRecord {
        FeedbackRecord {
            id,
            name: "Ana".into(),
            email: "ana@x.com".into(),
            message: "Great!".into(),
            rating,
            created_at: "2024-03-05T14:07:00.000Z".into(),
        }
    }

    #[test]
    fn form_requires_every_field_and_a_star() {
        let mut form = FeedbackForm {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            message: "Great!".into(),
            rating: 0,
        };
        assert!(!form.is_complete());
        form.rating = 5;
        assert!(form.is_complete());
        form.email.clear();
        assert!(!form.is_complete());
    }

    #[test]
    fn submission_carries_timestamp() {
        let form = FeedbackForm {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            message: "Great!".into(),
            rating: 4,
        };
        let sub = form.to_submission("2024-01-01T00:00:00.000Z".into());
        assert_eq!(sub.rating, 4);
        assert_eq!(sub.created_at.as_deref(), Some("2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn starts_loading() {
        let app = app();
        assert!(app.loading);
        assert!(app.feedbacks.is_empty());
    }

    #[test]
    fn incomplete_submit_shows_error_without_sending() {
        let mut app = app();
        let _ = app.update(Message::NameChanged("Ana".into()));
        let _ = app.update(Message::Submit);
        assert_eq!(app.form_error, INCOMPLETE_FORM);
        assert!(!app.is_submitting);
    }

    #[test]
    fn complete_submit_marks_in_flight() {
        let mut app = app();
        let _ = app.update(Message::NameChanged("Ana".into()));
        let _ = app.update(Message::EmailChanged("ana@x.com".into()));
        let _ = app.update(Message::MessageChanged("Great!".into()));
        let _ = app.update(Message::RatingSelected(5));
        let _ = app.update(Message::Submit);
        assert!(app.is_submitting);
        assert!(app.form_error.is_empty());
    }

    #[test]
    fn successful_submit_clears_form_and_reloads() {
        let mut app = app();
        let _ = app.update(Message::FeedbacksLoaded(Ok(vec![])));
        let _ = app.update(Message::NameChanged("Ana".into()));
        let _ = app.update(Message::Submitted(Ok(record(1, 5))));
        assert_eq!(app.form, FeedbackForm::default());
        assert!(app.loading);
    }

    #[test]
    fn failed_submit_keeps_form() {
        let mut app = app();
        let _ = app.update(Message::NameChanged("Ana".into()));
        let _ = app.update(Message::Submitted(Err("connection refused".into())));
        assert_eq!(app.form_error, SUBMIT_FAILED);
        assert_eq!(app.form.name, "Ana");
    }

    #[test]
    fn failed_load_falls_back_to_empty_list() {
        let mut app = app();
        let _ = app.update(Message::FeedbacksLoaded(Ok(vec![record(1, 5)])));
        assert_eq!(app.feedbacks.len(), 1);
        let _ = app.update(Message::FeedbacksLoaded(Err("down".into())));
        assert!(!app.loading);
        assert!(app.feedbacks.is_empty());
        assert!(app.load_error.is_some());
    }

    #[test]
    fn theme_toggles() {
        let mut app = app();
        let _ = app.update(Message::ToggleTheme);
        assert_eq!(app.theme, Theme::Dark);
        let _ = app.update(Message::ToggleTheme);
        assert_eq!(app.theme, Theme::Light);
    }

    #[test]
    fn star_strings() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(5), "★★★★★");
        assert_eq!(stars(0), "☆☆☆☆☆");
    }

    #[test]
    fn created_at_formatting() {
        assert_eq!(
            format_created_at_in("2024-03-05T14:07:00.000Z", &Utc),
            "Mar 5, 2024, 02:07 PM"
        );
        assert_eq!(format_created_at_in("yesterday", &Utc), "yesterday");
    }
}
