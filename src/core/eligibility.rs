use crate::models::{Gender, Ride, RiderPreferences};

/// Check whether a rider may join a candidate ride at all
///
/// Every driver-declared rule must pass; rules are independent of each
/// other and of scoring. Pure predicate, no I/O.
///
/// Note on rule 3: a rider who *tolerates* smoking is treated as a
/// smoker and turned away from no-smoking rides. Intentional business
/// rule, not a bug.
#[inline]
pub fn is_eligible(ride: &Ride, prefs: &RiderPreferences) -> bool {
    if ride.rules.female_only && prefs.gender != Gender::Female {
        return false;
    }

    // A rider travelling with a pet cannot join a no-pet ride
    if !ride.rules.pet_allowed && prefs.pet_allowed {
        return false;
    }

    if ride.rules.no_smoking && prefs.smoking_allowed {
        return false;
    }

    true
}
