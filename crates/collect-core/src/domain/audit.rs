//! Audit event domain entities
//!
//! This module defines the record written to a form's audit log: one
//! [`AuditEvent`] per user action or system condition observed during
//! form entry, serialized as a single comma-separated line.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Literal written in place of an absent node or location component.
const NULL_LITERAL: &str = "null";

/// Kinds of events that can be recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A question was shown to the user
    Question,
    /// The user jumped to the form hierarchy view
    Hierarchy,
    /// A new form was started
    FormStart,
    /// The form was exited
    FormExit,
    /// A saved form was resumed
    FormResume,
    /// The form was saved
    FormSave,
    /// The form was finalized
    FormFinalize,
    /// Saving the form failed
    SaveError,
    /// Finalizing the form failed
    FinalizeError,
    /// An answer violated a constraint
    ConstraintError,
    /// A repeat group instance was deleted
    DeleteRepeat,
    /// Location services are unavailable on the device
    GooglePlayServicesNotAvailable,
    /// The user granted location permissions
    LocationPermissionsGranted,
    /// The user denied location permissions
    LocationPermissionsNotGranted,
    /// Background location tracking was switched on
    BackgroundLocationEnabled,
    /// Background location tracking was switched off
    BackgroundLocationDisabled,
    /// Location providers became available
    LocationProvidersEnabled,
    /// Location providers became unavailable
    LocationProvidersDisabled,
    /// Sentinel for unrecognized event kinds
    Unknown,
}

impl AuditEventType {
    /// Every event type, in declaration order.
    pub const ALL: [AuditEventType; 19] = [
        AuditEventType::Question,
        AuditEventType::Hierarchy,
        AuditEventType::FormStart,
        AuditEventType::FormExit,
        AuditEventType::FormResume,
        AuditEventType::FormSave,
        AuditEventType::FormFinalize,
        AuditEventType::SaveError,
        AuditEventType::FinalizeError,
        AuditEventType::ConstraintError,
        AuditEventType::DeleteRepeat,
        AuditEventType::GooglePlayServicesNotAvailable,
        AuditEventType::LocationPermissionsGranted,
        AuditEventType::LocationPermissionsNotGranted,
        AuditEventType::BackgroundLocationEnabled,
        AuditEventType::BackgroundLocationDisabled,
        AuditEventType::LocationProvidersEnabled,
        AuditEventType::LocationProvidersDisabled,
        AuditEventType::Unknown,
    ];

    /// Label written as the first field of an audit log line.
    ///
    /// These strings are read by downstream log consumers and must not change.
    pub const fn label(&self) -> &'static str {
        match self {
            AuditEventType::Question => "question",
            AuditEventType::Hierarchy => "jump",
            AuditEventType::FormStart => "form start",
            AuditEventType::FormExit => "form exit",
            AuditEventType::FormResume => "form resume",
            AuditEventType::FormSave => "form save",
            AuditEventType::FormFinalize => "form finalize",
            AuditEventType::SaveError => "save error",
            AuditEventType::FinalizeError => "finalize error",
            AuditEventType::ConstraintError => "constraint error",
            AuditEventType::DeleteRepeat => "delete repeat",
            AuditEventType::GooglePlayServicesNotAvailable => {
                "google play services not available"
            }
            AuditEventType::LocationPermissionsGranted => "location permissions granted",
            AuditEventType::LocationPermissionsNotGranted => "location permissions not granted",
            AuditEventType::BackgroundLocationEnabled => "background location enabled",
            AuditEventType::BackgroundLocationDisabled => "background location disabled",
            AuditEventType::LocationProvidersEnabled => "location providers enabled",
            AuditEventType::LocationProvidersDisabled => "location providers disabled",
            AuditEventType::Unknown => "Unknown AuditEvent Type",
        }
    }

    /// Looks up an event type by its label.
    ///
    /// Labels this version does not know map to [`AuditEventType::Unknown`],
    /// so logs written by newer producers still load.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label() == label)
            .unwrap_or(AuditEventType::Unknown)
    }

    /// Returns true for events that span time (they carry an end timestamp)
    pub const fn is_interval(&self) -> bool {
        matches!(self, AuditEventType::Question | AuditEventType::Hierarchy)
    }

    /// Returns true for events that report location tracking conditions
    pub const fn is_location_event(&self) -> bool {
        matches!(
            self,
            AuditEventType::GooglePlayServicesNotAvailable
                | AuditEventType::LocationPermissionsGranted
                | AuditEventType::LocationPermissionsNotGranted
                | AuditEventType::BackgroundLocationEnabled
                | AuditEventType::BackgroundLocationDisabled
                | AuditEventType::LocationProvidersEnabled
                | AuditEventType::LocationProvidersDisabled
        )
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Location components attached to an event.
///
/// The three values are always set together. A component is `None` when the
/// fix was attempted but that value was unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCoordinates {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub accuracy: Option<String>,
}

/// A single audit log record
///
/// Created when the triggering action begins, optionally annotated with
/// location, optionally closed with an end timestamp, then serialized with
/// [`AuditEvent::to_canonical_string`]. Timestamps are milliseconds since
/// the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    event_type: AuditEventType,
    start: i64,
    end: Option<i64>,
    node: Option<String>,
    location: Option<LocationCoordinates>,
}

impl AuditEvent {
    /// Creates a new event that started at `start`
    ///
    /// # Example
    ///
    /// ```
    /// use collect_core::domain::audit::{AuditEvent, AuditEventType};
    ///
    /// let mut event = AuditEvent::new(1545392727685, AuditEventType::Question, Some("/data/text1"));
    /// assert_eq!(event.to_canonical_string(), "question,/data/text1,1545392727685,");
    ///
    /// event.set_end(1545392728527);
    /// assert_eq!(event.to_canonical_string(), "question,/data/text1,1545392727685,1545392728527");
    /// ```
    pub fn new(start: i64, event_type: AuditEventType, node: Option<&str>) -> Self {
        Self {
            event_type,
            start,
            end: None,
            node: node.map(str::to_owned),
            location: None,
        }
    }

    /// Returns the event type
    pub fn event_type(&self) -> AuditEventType {
        self.event_type
    }

    /// Returns when the event started
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Returns when the event ended, if it has been closed
    pub fn end(&self) -> Option<i64> {
        self.end
    }

    /// Returns the node (form field path) this event refers to
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// Returns the location group, if one was attached
    pub fn location(&self) -> Option<&LocationCoordinates> {
        self.location.as_ref()
    }

    /// Returns true if this event's type spans time
    pub fn is_interval_event_type(&self) -> bool {
        self.event_type.is_interval()
    }

    /// Returns `end - start` once the event has been closed, saturating at
    /// the `i64` bounds
    pub fn duration_ms(&self) -> Option<i64> {
        self.end.map(|end| end.saturating_sub(self.start))
    }

    /// Records when the event ended.
    ///
    /// No ordering check is made against `start`; a second call replaces the
    /// earlier value.
    pub fn set_end(&mut self, end: i64) {
        self.end = Some(end);
    }

    /// Attaches location components as one group.
    pub fn set_location_coordinates(
        &mut self,
        latitude: Option<&str>,
        longitude: Option<&str>,
        accuracy: Option<&str>,
    ) {
        self.location = Some(LocationCoordinates {
            latitude: latitude.map(str::to_owned),
            longitude: longitude.map(str::to_owned),
            accuracy: accuracy.map(str::to_owned),
        });
    }

    /// Renders the audit log line for this event
    ///
    /// Always four fields (`label,node,start,end`); three more
    /// (`latitude,longitude,accuracy`) only when a location group was set.
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }

    /// Parses a line produced by [`AuditEvent::to_canonical_string`].
    ///
    /// A node or location component written as `null` is read back as `None`.
    pub fn parse_line(line: &str) -> Result<Self, DomainError> {
        let malformed = |reason: String| DomainError::MalformedAuditLine {
            line: line.to_string(),
            reason,
        };

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 4 && fields.len() != 7 {
            return Err(malformed(format!(
                "expected 4 or 7 fields, found {}",
                fields.len()
            )));
        }

        let event_type = AuditEventType::from_label(fields[0]);
        let start = parse_timestamp(fields[2]).map_err(|e| malformed(e.to_string()))?;

        let mut event = AuditEvent::new(start, event_type, nullable(fields[1]));

        if !fields[3].is_empty() {
            let end = parse_timestamp(fields[3]).map_err(|e| malformed(e.to_string()))?;
            event.set_end(end);
        }

        if fields.len() == 7 {
            event.set_location_coordinates(
                nullable(fields[4]),
                nullable(fields[5]),
                nullable(fields[6]),
            );
        }

        Ok(event)
    }
}

fn nullable(field: &str) -> Option<&str> {
    (field != NULL_LITERAL).then_some(field)
}

fn parse_timestamp(field: &str) -> Result<i64, DomainError> {
    field
        .trim()
        .parse::<i64>()
        .map_err(|_| DomainError::InvalidTimestamp(field.to_string()))
}

fn write_nullable(f: &mut fmt::Formatter<'_>, value: Option<&str>) -> fmt::Result {
    f.write_str(value.unwrap_or(NULL_LITERAL))
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},", self.event_type.label())?;
        write_nullable(f, self.node())?;
        write!(f, ",{},", self.start)?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }

        if let Some(location) = &self.location {
            f.write_str(",")?;
            write_nullable(f, location.latitude.as_deref())?;
            f.write_str(",")?;
            write_nullable(f, location.longitude.as_deref())?;
            f.write_str(",")?;
            write_nullable(f, location.accuracy.as_deref())?;
        }
        Ok(())
    }
}
