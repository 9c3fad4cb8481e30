//! Request orchestration
//!
//! Wires a data source, a categorizer and a display together. One submit
//! moves the widget through `Idle -> Pending -> Success | Failed`; while a
//! request is pending the trigger is disabled and further submits are
//! ignored.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::category::Categorizer;
use crate::display::{DisplayFrame, DisplaySink, Severity, StatusLine};
use crate::models::{AqiReading, LocationQuery};
use crate::source::AqiSource;
use crate::{AirQualityError, Result};

const EMPTY_INPUT_ADVICE: &str = "Enter a location to see health advice.";
const FETCH_FAILED_ADVICE: &str = "Could not retrieve health advice due to a data fetching error.";
const FETCH_SUCCEEDED: &str = "AQI fetched successfully!";
const INTERRUPTED_MESSAGE: &str = "The lookup was interrupted before it finished.";

/// Where the widget is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Nothing submitted yet
    Idle,
    /// A lookup is in flight; the trigger is disabled
    Pending,
    /// Last lookup produced this AQI
    Success(i32),
    /// Last lookup failed
    Failed,
}

/// The air quality widget
pub struct AqiWidget<S, D> {
    source: S,
    categorizer: Categorizer,
    state: Mutex<RequestState>,
    sink: Mutex<D>,
}

impl<S: AqiSource, D: DisplaySink> AqiWidget<S, D> {
    pub fn new(source: S, categorizer: Categorizer, sink: D) -> Self {
        Self {
            source,
            categorizer,
            state: Mutex::new(RequestState::Idle),
            sink: Mutex::new(sink),
        }
    }

    #[must_use]
    pub fn state(&self) -> RequestState {
        *self.lock_state()
    }

    /// False while a request is pending
    #[must_use]
    pub fn is_trigger_enabled(&self) -> bool {
        self.state() != RequestState::Pending
    }

    #[must_use]
    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// Inspect the display sink
    pub fn with_sink<T>(&self, f: impl FnOnce(&D) -> T) -> T {
        f(&self.sink.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn into_sink(self) -> D {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit a location.
    ///
    /// Returns `Busy` without touching the display when a request is
    /// already pending, and `Validation` without contacting the source when
    /// the input is blank. Every other outcome settles the request and is
    /// reflected on the display. If the display cannot be written, the
    /// request still settles but the display error is returned instead.
    ///
    /// Dropping the returned future mid-lookup settles the request as
    /// failed, so the trigger is always re-enabled.
    #[tracing::instrument(name = "submit", skip_all, fields(input = %input))]
    pub async fn submit(&self, input: &str) -> Result<AqiReading> {
        let location = self.begin(input)?;
        let slot = PendingSlot { widget: self };

        let outcome = self.source.fetch(&location).await;

        std::mem::forget(slot);
        self.settle(location, outcome)
    }

    fn lock_state(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, frame: &DisplayFrame) -> Result<()> {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.render(frame).inspect_err(|e| {
            warn!("Failed to render display frame: {}", e);
        })
    }

    fn failure_frame(e: &AirQualityError) -> DisplayFrame {
        DisplayFrame::blank(
            StatusLine {
                message: format!("Error: {}", e.user_message()),
                severity: Severity::Error,
            },
            FETCH_FAILED_ADVICE,
            true,
        )
    }

    /// Validate the input and claim the request slot
    fn begin(&self, input: &str) -> Result<LocationQuery> {
        let mut state = self.lock_state();
        if *state == RequestState::Pending {
            debug!("Submit ignored, a request is already pending");
            return Err(AirQualityError::Busy);
        }

        let location = match LocationQuery::parse(input) {
            Ok(location) => location,
            Err(e) => {
                debug!("Rejected input: {}", e);
                self.render(&DisplayFrame::blank(
                    StatusLine {
                        message: e.user_message(),
                        severity: Severity::Error,
                    },
                    EMPTY_INPUT_ADVICE,
                    true,
                ))?;
                return Err(e);
            }
        };

        let previous = *state;
        debug!(from = ?previous, "Request pending");
        *state = RequestState::Pending;
        if let Err(e) = self.render(&DisplayFrame::blank(
            StatusLine {
                message: format!("Fetching AQI for {location}..."),
                severity: Severity::Pending,
            },
            "",
            false,
        )) {
            *state = previous;
            return Err(e);
        }

        Ok(location)
    }

    /// Record the outcome, update the display and release the slot
    fn settle(&self, location: LocationQuery, outcome: Result<i32>) -> Result<AqiReading> {
        let mut state = self.lock_state();
        match outcome {
            Ok(aqi) => {
                let presentation = self.categorizer.categorize(aqi);
                info!(location = %location, aqi, category = ?presentation.category, "AQI fetched");
                *state = RequestState::Success(aqi);
                self.render(&DisplayFrame::reading(
                    StatusLine {
                        message: FETCH_SUCCEEDED.to_string(),
                        severity: Severity::Success,
                    },
                    aqi,
                    &presentation,
                ))?;
                Ok(AqiReading {
                    location,
                    aqi,
                    presentation,
                })
            }
            Err(e) => {
                warn!(location = %location, "AQI lookup failed: {}", e);
                *state = RequestState::Failed;
                self.render(&Self::failure_frame(&e))?;
                Err(e)
            }
        }
    }

    /// Settle a request whose submit future was dropped mid-lookup
    fn abandon(&self) {
        let mut state = self.lock_state();
        if *state != RequestState::Pending {
            return;
        }
        warn!("Submit dropped before the lookup finished");
        *state = RequestState::Failed;
        let _ = self.render(&Self::failure_frame(&AirQualityError::fetch(
            INTERRUPTED_MESSAGE,
        )));
    }
}

/// Held across the lookup; releases the request slot if the submit future is
/// dropped before it settles
struct PendingSlot<'a, S: AqiSource, D: DisplaySink> {
    widget: &'a AqiWidget<S, D>,
}

impl<S: AqiSource, D: DisplaySink> Drop for PendingSlot<'_, S, D> {
    fn drop(&mut self) {
        self.widget.abandon();
    }
}
