// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rota_domain::{PunchKind, Shift, UserId};
use time::{Date, Month, PrimitiveDateTime};

/// Commands that can be applied to roster state.
///
/// Month-scoped commands go through [`crate::apply`]; administrative
/// commands (`GrantUnlock`, `SetDeadlineDay`) go through
/// [`crate::apply_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a new shift. The shift's date decides the scoped month.
    RegisterShift {
        /// The shift to register.
        shift: Shift,
    },
    /// Replace the existing shift on the shift's date.
    UpdateShift {
        /// The replacement shift.
        shift: Shift,
    },
    /// Delete the shift on a date. Refused while attendance exists.
    DeleteShift {
        /// The staff member holding the shift.
        user_id: UserId,
        /// The date to clear.
        date: Date,
    },
    /// Record one attendance punch.
    RecordPunch {
        /// The staff member punching.
        user_id: UserId,
        /// The logical date of the punch.
        date: Date,
        /// The punch kind.
        kind: PunchKind,
        /// When the punch was recorded.
        recorded_at: PrimitiveDateTime,
        /// Whether an administrator recorded this punch on the member's
        /// behalf.
        forced: bool,
    },
    /// Amend an existing punch timestamp, leaving a correction record.
    CorrectPunch {
        /// The staff member whose punch is amended.
        user_id: UserId,
        /// The date of the punch.
        date: Date,
        /// The punch kind.
        kind: PunchKind,
        /// The corrected timestamp.
        new_recorded_at: PrimitiveDateTime,
        /// The administrator approving the amendment.
        approved_by: UserId,
        /// When the amendment was made.
        corrected_at: PrimitiveDateTime,
    },
    /// Grant a one-hour registration unlock for a member's month.
    GrantUnlock {
        /// The staff member to unlock.
        user_id: UserId,
        /// Calendar year of the unlocked month.
        year: i32,
        /// Calendar month.
        month: Month,
        /// When the grant was made; expiry is measured from this instant.
        granted_at: PrimitiveDateTime,
    },
    /// Change the monthly registration deadline day.
    SetDeadlineDay {
        /// The new day-of-month, between 1 and 31.
        day: u8,
    },
}
