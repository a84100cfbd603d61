//! SCMI Error Types
//!
//! Errors produced by the SCMI transport and the protocol clients built on top of it, along with their conversions
//! into UEFI status codes.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt::{self, Display};

use r_efi::efi;

/// A specialized [`Result`](core::result::Result) type for SCMI operations.
pub type Result<T> = core::result::Result<T, ScmiError>;

/// SCMI Transport and Protocol Errors
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScmiError {
    /// A message or requested response does not fit in the mailbox, or the mailbox description is invalid.
    ///
    /// Detected before the mailbox or doorbell is touched.
    InvalidParameter,
    /// The remote agent did not mark the channel free within the poll budget.
    ///
    /// The channel is left busy and must be recovered before it is used again.
    Timeout,
    /// The response carries more words than the caller allowed for.
    BufferTooSmall {
        /// Number of payload words the remote agent returned.
        required: usize,
    },
    /// A previous request on this channel timed out and the channel has not been recovered.
    ChannelBusy,
    /// The remote agent wrote a response that cannot be decoded.
    InvalidResponse,
    /// The remote agent completed the request with a non-success SCMI status.
    Protocol(ScmiStatus),
}

impl Display for ScmiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScmiError::InvalidParameter => write!(f, "Invalid parameter"),
            ScmiError::Timeout => write!(f, "Timed out waiting for the SCMI channel to become free"),
            ScmiError::BufferTooSmall { required } => {
                write!(f, "Response buffer too small, {required} words required")
            }
            ScmiError::ChannelBusy => write!(f, "SCMI channel still owns a timed out request"),
            ScmiError::InvalidResponse => write!(f, "Malformed SCMI response"),
            ScmiError::Protocol(status) => write!(f, "SCMI status {status:?}"),
        }
    }
}

impl core::error::Error for ScmiError {}

impl From<ScmiError> for efi::Status {
    fn from(value: ScmiError) -> Self {
        match value {
            ScmiError::InvalidParameter => efi::Status::INVALID_PARAMETER,
            ScmiError::Timeout => efi::Status::TIMEOUT,
            ScmiError::BufferTooSmall { .. } => efi::Status::BUFFER_TOO_SMALL,
            ScmiError::ChannelBusy => efi::Status::NOT_READY,
            ScmiError::InvalidResponse => efi::Status::DEVICE_ERROR,
            ScmiError::Protocol(status) => status.into(),
        }
    }
}

impl From<ScmiStatus> for ScmiError {
    fn from(value: ScmiStatus) -> Self {
        ScmiError::Protocol(value)
    }
}

/// SCMI Status Codes
///
/// The signed status word a remote agent places first in every response payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScmiStatus {
    Success,
    NotSupported,
    InvalidParameters,
    Denied,
    NotFound,
    OutOfRange,
    Busy,
    CommsError,
    GenericError,
    HardwareError,
    ProtocolError,
    /// A status value not defined by the SCMI specification.
    Unknown(i32),
}

impl ScmiStatus {
    /// Interprets a raw response word as an SCMI status.
    pub fn from_word(word: u32) -> Self {
        match word as i32 {
            0 => ScmiStatus::Success,
            -1 => ScmiStatus::NotSupported,
            -2 => ScmiStatus::InvalidParameters,
            -3 => ScmiStatus::Denied,
            -4 => ScmiStatus::NotFound,
            -5 => ScmiStatus::OutOfRange,
            -6 => ScmiStatus::Busy,
            -7 => ScmiStatus::CommsError,
            -8 => ScmiStatus::GenericError,
            -9 => ScmiStatus::HardwareError,
            -10 => ScmiStatus::ProtocolError,
            other => ScmiStatus::Unknown(other),
        }
    }

    /// Returns the raw signed value of the status.
    pub fn as_i32(&self) -> i32 {
        match self {
            ScmiStatus::Success => 0,
            ScmiStatus::NotSupported => -1,
            ScmiStatus::InvalidParameters => -2,
            ScmiStatus::Denied => -3,
            ScmiStatus::NotFound => -4,
            ScmiStatus::OutOfRange => -5,
            ScmiStatus::Busy => -6,
            ScmiStatus::CommsError => -7,
            ScmiStatus::GenericError => -8,
            ScmiStatus::HardwareError => -9,
            ScmiStatus::ProtocolError => -10,
            ScmiStatus::Unknown(value) => *value,
        }
    }

    /// Converts a raw response status word to a `Result`.
    ///
    /// `SUCCESS` yields `Ok(())`, every other value yields [`ScmiError::Protocol`].
    pub fn word_to_result(word: u32) -> Result<()> {
        match Self::from_word(word) {
            ScmiStatus::Success => Ok(()),
            status => Err(ScmiError::Protocol(status)),
        }
    }
}

impl From<ScmiStatus> for efi::Status {
    fn from(value: ScmiStatus) -> Self {
        match value {
            ScmiStatus::Success => efi::Status::SUCCESS,
            ScmiStatus::NotSupported => efi::Status::UNSUPPORTED,
            ScmiStatus::InvalidParameters => efi::Status::INVALID_PARAMETER,
            ScmiStatus::Denied => efi::Status::ACCESS_DENIED,
            ScmiStatus::NotFound => efi::Status::NOT_FOUND,
            ScmiStatus::OutOfRange => efi::Status::BAD_BUFFER_SIZE,
            ScmiStatus::Busy => efi::Status::NOT_READY,
            ScmiStatus::ProtocolError => efi::Status::PROTOCOL_ERROR,
            ScmiStatus::CommsError
            | ScmiStatus::GenericError
            | ScmiStatus::HardwareError
            | ScmiStatus::Unknown(_) => efi::Status::DEVICE_ERROR,
        }
    }
}
