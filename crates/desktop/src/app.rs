use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{button, column, container, image, row, scrollable, text, text_input, Space};
use iced::{Color, Element, Length, Subscription, Task, Theme};

use facelink_core::protocol::envelope::LiveSessionSummaryEnvelope;
use facelink_core::session::orchestrator::SessionOrchestrator;
use facelink_core::shared::config::WorkerConfig;
use facelink_core::shared::constants::IMAGE_EXTENSIONS;
use facelink_core::worker::infrastructure::system_runner::SystemWorkerRunner;

use crate::theme;
use crate::workers::session_worker::{self, SessionEvent, SessionJob};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    SelectImage,
    ImageSelected(Option<PathBuf>),
    ClearImage,
    NameChanged(String),
    AddIdentity,
    DetectFaces,
    StartLive,
    OpenCamera,
    OpenAnnotated,
    RefreshIdentities,
    ResetRequested,
    ResetConfirmed,
    ResetCancelled,
    Poll,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    session: Arc<Mutex<SessionOrchestrator>>,
    identities: Vec<String>,
    name_input: String,
    source_image: Option<PathBuf>,
    annotated_image: Option<PathBuf>,
    status: String,
    confirm_reset: bool,
    running: Option<Receiver<SessionEvent>>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let session = Arc::new(Mutex::new(SessionOrchestrator::new(
            WorkerConfig::default(),
            Box::new(SystemWorkerRunner),
        )));

        let mut app = Self {
            session,
            identities: Vec::new(),
            name_input: String::new(),
            source_image: None,
            annotated_image: None,
            status: String::from("Loading known identities..."),
            confirm_reset: false,
            running: None,
        };
        app.dispatch(SessionJob::RefreshIdentities);

        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectImage => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select an image")
                            .add_filter("Images", IMAGE_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::ImageSelected,
                );
            }
            Message::ImageSelected(Some(path)) => {
                // The dialog is async, so its answer can land mid-job.
                if self.busy() {
                    self.status = String::from("Ignored the selection while a task is running.");
                    return Task::none();
                }
                self.session.lock().unwrap().select_image(path.clone());
                self.status = format!("Selected {}.", file_label(&path));
                self.source_image = Some(path);
                self.annotated_image = None;
            }
            Message::ImageSelected(None) => {}
            Message::ClearImage => {
                if self.busy() {
                    return Task::none();
                }
                self.session.lock().unwrap().clear_selection();
                self.source_image = None;
                self.annotated_image = None;
                self.status = String::from("Selection cleared.");
            }
            Message::NameChanged(value) => {
                self.name_input = value;
            }
            Message::AddIdentity => {
                if self.busy() {
                    return Task::none();
                }
                let Some(image) = self.source_image.clone() else {
                    self.status = String::from("Select an image first.");
                    return Task::none();
                };
                let label = self.name_input.trim().to_string();
                if label.is_empty() {
                    self.status = String::from("Enter a name first.");
                    return Task::none();
                }
                self.status = format!("Registering '{label}'...");
                self.dispatch(SessionJob::AddIdentity { image, label });
            }
            Message::DetectFaces => {
                if self.busy() {
                    return Task::none();
                }
                self.status = String::from("Detecting faces...");
                self.dispatch(SessionJob::DetectFaces {
                    label_hint: self.name_input.trim().to_string(),
                });
            }
            Message::StartLive => {
                if self.busy() {
                    return Task::none();
                }
                self.status =
                    String::from("Live recognition running, close the video window to finish.");
                self.dispatch(SessionJob::LiveRecognition);
            }
            Message::OpenCamera => {
                if self.busy() {
                    return Task::none();
                }
                let result = self.session.lock().unwrap().launch_camera_window();
                self.status = match result {
                    Ok(()) => String::from("Camera window opened."),
                    Err(e) => e.to_string(),
                };
            }
            Message::OpenAnnotated => {
                if let Some(path) = &self.annotated_image {
                    if let Err(e) = open::that(path) {
                        self.status = format!("Could not open {}: {e}", path.display());
                    }
                }
            }
            Message::RefreshIdentities => {
                if self.busy() {
                    return Task::none();
                }
                self.status = String::from("Refreshing known identities...");
                self.dispatch(SessionJob::RefreshIdentities);
            }
            Message::ResetRequested => {
                self.confirm_reset = true;
            }
            Message::ResetCancelled => {
                self.confirm_reset = false;
            }
            Message::ResetConfirmed => {
                self.confirm_reset = false;
                if self.busy() {
                    return Task::none();
                }
                self.status = String::from("Resetting the identity store...");
                self.dispatch(SessionJob::ResetStore);
            }
            Message::Poll => {
                self.poll_events();
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        if self.confirm_reset {
            return self.reset_confirm_view();
        }

        let muted = theme::muted_color(&self.theme());
        let busy = self.busy();

        let body = row![self.identity_panel(busy, muted), self.image_panel(busy, muted)]
            .spacing(16)
            .height(Length::Fill);

        // Status line
        let footer = container(text(&self.status).size(12).color(muted))
            .width(Length::Fill)
            .padding([4, 4]);

        column![body, self.action_bar(busy), footer]
            .spacing(12)
            .padding(14)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::app_theme()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.running.is_some() {
            iced::time::every(Duration::from_millis(100)).map(|_| Message::Poll)
        } else {
            Subscription::none()
        }
    }

    // -----------------------------------------------------------------------
    // Background jobs
    // -----------------------------------------------------------------------

    fn busy(&self) -> bool {
        self.running.is_some()
    }

    fn dispatch(&mut self, job: SessionJob) {
        self.running = Some(session_worker::spawn(self.session.clone(), job));
    }

    fn poll_events(&mut self) {
        let Some(rx) = &self.running else {
            return;
        };
        match rx.try_recv() {
            Ok(event) => {
                self.running = None;
                self.apply(event);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.running = None;
                self.status = String::from("Background task stopped without reporting.");
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Refreshed { identities } => {
                self.status = match identities.len() {
                    0 => String::from("No identities registered yet."),
                    1 => String::from("1 known identity."),
                    n => format!("{n} known identities."),
                };
                self.identities = identities;
            }
            SessionEvent::IdentityAdded {
                identities,
                label,
                message,
            } => {
                self.identities = identities;
                self.status = message.unwrap_or_else(|| format!("Registered '{label}'."));
                self.name_input.clear();
            }
            SessionEvent::DetectionFinished {
                face_count,
                annotated,
            } => {
                self.status = match face_count {
                    0 => String::from("No faces detected."),
                    1 => String::from("Detected 1 face."),
                    n => format!("Detected {n} faces."),
                };
                self.annotated_image = annotated;
            }
            SessionEvent::LiveFinished {
                summary: Some(summary),
            } => {
                self.status = live_summary_status(&summary);
            }
            SessionEvent::LiveFinished { summary: None } => {
                self.status = String::from("Live session ended.");
            }
            SessionEvent::StoreCleared { identities } => {
                self.identities = identities;
                self.status = String::from("Identity store reset.");
            }
            SessionEvent::Failed(message) => {
                self.status = message;
            }
        }
    }

    // -----------------------------------------------------------------------
    // View pieces
    // -----------------------------------------------------------------------

    fn identity_panel(&self, busy: bool, muted: Color) -> Element<'_, Message> {
        let heading = text("Known identities").size(16);

        let names: Element<'_, Message> = if self.identities.is_empty() {
            text("None registered yet.").size(13).color(muted).into()
        } else {
            column(
                self.identities
                    .iter()
                    .map(|name| text(name).size(13).into())
                    .collect::<Vec<_>>(),
            )
            .spacing(4)
            .into()
        };

        let controls = row![
            button(text("Refresh").size(13))
                .on_press_maybe((!busy).then_some(Message::RefreshIdentities))
                .style(button::secondary)
                .padding([6, 14]),
            button(text("Reset...").size(13))
                .on_press_maybe((!busy).then_some(Message::ResetRequested))
                .style(button::danger)
                .padding([6, 14]),
        ]
        .spacing(8);

        container(column![heading, scrollable(names).height(Length::Fill), controls].spacing(12))
            .width(210)
            .height(Length::Fill)
            .into()
    }

    fn image_panel(&self, busy: bool, muted: Color) -> Element<'_, Message> {
        // The annotated output replaces the raw selection once it exists.
        let shown = self.annotated_image.as_ref().or(self.source_image.as_ref());

        let preview: Element<'_, Message> = match shown {
            Some(path) => image(image::Handle::from_path(path))
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(text("No image selected.").size(14).color(muted))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let caption = match (&self.annotated_image, &self.source_image) {
            (Some(annotated), _) => format!("Annotated: {}", file_label(annotated)),
            (None, Some(source)) => file_label(source),
            (None, None) => String::new(),
        };

        let selection = row![
            button(text("Select Image").size(13))
                .on_press_maybe((!busy).then_some(Message::SelectImage))
                .style(button::primary)
                .padding([6, 14]),
            button(text("Clear").size(13))
                .on_press_maybe(
                    (!busy && self.source_image.is_some()).then_some(Message::ClearImage)
                )
                .style(button::text)
                .padding([6, 14]),
            button(text("Open Annotated").size(13))
                .on_press_maybe(self.annotated_image.is_some().then_some(Message::OpenAnnotated))
                .style(button::text)
                .padding([6, 14]),
        ]
        .spacing(8);

        column![
            preview,
            text(caption).size(12).color(muted),
            Space::new().height(4),
            selection,
        ]
        .spacing(6)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn action_bar(&self, busy: bool) -> Element<'_, Message> {
        let can_add = !busy && self.source_image.is_some() && !self.name_input.trim().is_empty();
        let can_detect = !busy && self.source_image.is_some();
        let can_live = !busy && !self.identities.is_empty();

        let name_field = text_input("Person name", &self.name_input)
            .on_input(Message::NameChanged)
            .on_submit(Message::AddIdentity)
            .size(13)
            .padding([6, 10])
            .width(180);

        row![
            name_field,
            button(text("Add Identity").size(13))
                .on_press_maybe(can_add.then_some(Message::AddIdentity))
                .style(button::primary)
                .padding([6, 14]),
            button(text("Detect Faces").size(13))
                .on_press_maybe(can_detect.then_some(Message::DetectFaces))
                .style(button::primary)
                .padding([6, 14]),
            button(text("Live Recognition").size(13))
                .on_press_maybe(can_live.then_some(Message::StartLive))
                .style(button::success)
                .padding([6, 14]),
            button(text("Camera Window").size(13))
                .on_press_maybe((!busy).then_some(Message::OpenCamera))
                .style(button::secondary)
                .padding([6, 14]),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn reset_confirm_view(&self) -> Element<'_, Message> {
        let pane = column![
            text("Reset identity store?").size(18),
            Space::new().height(8),
            text("All registered identities will be deleted. Are you sure?").size(14),
            Space::new().height(20),
            row![
                button(text("Yes, delete everything").size(14))
                    .on_press(Message::ResetConfirmed)
                    .style(button::danger)
                    .padding([8, 18]),
                button(text("No, keep them").size(14))
                    .on_press(Message::ResetCancelled)
                    .style(button::secondary)
                    .padding([8, 18]),
            ]
            .spacing(12),
        ]
        .align_x(iced::Alignment::Center);

        container(pane)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }
}

/// Short display form of a path, just the file name when there is one.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Status line for a finished live session. The average is rounded only
/// here; the envelope keeps full precision.
fn live_summary_status(summary: &LiveSessionSummaryEnvelope) -> String {
    format!(
        "Live session ended: {} face(s) over {} frame(s), {:.2} faces per frame.",
        summary.total_faces_detected, summary.frames_processed, summary.average_faces_per_frame
    )
}
