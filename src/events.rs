use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::filesystem::Entry;

/// Identifies one request on the [`EventChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// UI to backend messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    EnterDirectory { target: String },
    LeaveDirectory { from: String, target: String },
    DownloadFile { remote_path: String, local_path: String },
}

impl Topic {
    pub fn describe(&self) -> String {
        match self {
            Topic::EnterDirectory { target } | Topic::LeaveDirectory { target, .. } => {
                format!("loading {target}")
            }
            Topic::DownloadFile { remote_path, .. } => format!("downloading {remote_path}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: RequestId,
    pub topic: Topic,
}

/// Backend to UI messages.
#[derive(Debug)]
pub enum Response {
    DirectoryRead {
        id: RequestId,
        path: String,
        result: Result<Vec<Entry>>,
    },
    DownloadComplete {
        id: RequestId,
        remote_path: String,
        /// The file written, after a directory destination got the remote name
        local_path: String,
        result: Result<u64>,
    },
}

impl Response {
    pub fn id(&self) -> RequestId {
        match self {
            Response::DirectoryRead { id, .. } | Response::DownloadComplete { id, .. } => *id,
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Backend(Response),
    Disconnect, // Sent when the backend worker stops
}

/// Request side of the UI/backend boundary.
///
/// Only one request may be outstanding; [`EventChannel::publish`] refuses a new
/// one until [`EventChannel::resolve`] sees the reply for the current id.
pub struct EventChannel {
    requests: mpsc::Sender<Request>,
    next_id: u64,
    in_flight: Option<Request>,
}

impl EventChannel {
    pub fn new(requests: mpsc::Sender<Request>) -> Self {
        Self {
            requests,
            next_id: 1,
            in_flight: None,
        }
    }

    pub fn publish(&mut self, topic: Topic) -> Result<RequestId> {
        if let Some(pending) = &self.in_flight {
            return Err(AppError::RequestInFlight(format!(
                "still {}",
                pending.topic.describe()
            )));
        }

        let request = Request {
            id: RequestId(self.next_id),
            topic,
        };
        self.requests
            .try_send(request.clone())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    AppError::RequestInFlight("backend queue is full".to_string())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    AppError::ChannelClosedError("backend is not running".to_string())
                }
            })?;

        debug!("Published request {:?}: {:?}", request.id, request.topic);
        self.next_id += 1;
        let id = request.id;
        self.in_flight = Some(request);
        Ok(id)
    }

    /// Clear the in-flight slot if `id` is the outstanding request.
    pub fn resolve(&mut self, id: RequestId) -> Option<Request> {
        match &self.in_flight {
            Some(pending) if pending.id == id => self.in_flight.take(),
            _ => {
                warn!("Ignoring response for unknown request {:?}", id);
                None
            }
        }
    }

    pub fn in_flight(&self) -> Option<&Request> {
        self.in_flight.as_ref()
    }

    /// Drop the outstanding request after the backend went away.
    pub fn abandon(&mut self) -> Option<Request> {
        self.in_flight.take()
    }
}

/// Forward terminal input into the app event channel until `cancel` fires
/// or stdin closes.
pub fn spawn_input_reader(
    events: mpsc::Sender<AppEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut event_stream = EventStream::new();
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = event_stream.next() => event,
            };
            let event = match event {
                None => break,
                Some(Err(e)) => {
                    warn!("Terminal input error: {}", e);
                    break;
                }
                Some(Ok(event)) => event,
            };
            if events.send(AppEvent::Input(event)).await.is_err() {
                break;
            }
        }
        debug!("Input reader stopped");
    })
}
