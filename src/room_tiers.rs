// src/room_tiers.rs
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::RoomTierConfig;
use crate::error::{EngineError, EngineResult};
use crate::record::RoomCategory;

/// Rooms (or staff) needed for one room group on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomRequirement {
    pub category: RoomCategory,
    pub case_total: u32,
    pub rooms: u32,
}

/// Maps a day's case volume to a room count. Ultrasound follows the stepped
/// tier table and stops at its cap; every other group needs one room per
/// `room_capacity` cases, uncapped.
pub fn estimate_rooms(category_total: u32, category: RoomCategory, tiers: &RoomTierConfig) -> u32 {
    if category_total == 0 {
        return 0;
    }
    match category {
        RoomCategory::Ultrasound => tiered_rooms(category_total, &tiers.ultrasound_tiers),
        RoomCategory::XRay
        | RoomCategory::Ecg
        | RoomCategory::Gynecology
        | RoomCategory::GeneralMedicine => category_total.div_ceil(tiers.room_capacity.max(1)),
    }
}

/// Same as [`estimate_rooms`] with the group given by name (`"ultrasound"`, `"ecg"`, ...).
pub fn estimate_rooms_by_name(
    category_total: u32,
    category: &str,
    tiers: &RoomTierConfig,
) -> EngineResult<u32> {
    let category = category
        .parse::<RoomCategory>()
        .map_err(EngineError::Config)?;
    Ok(estimate_rooms(category_total, category, tiers))
}

/// Room requirement for every group, zero-volume groups included.
pub fn estimate_all(
    group_totals: &BTreeMap<RoomCategory, u32>,
    tiers: &RoomTierConfig,
) -> BTreeMap<RoomCategory, RoomRequirement> {
    RoomCategory::ALL
        .iter()
        .map(|category| {
            let case_total = group_totals.get(category).copied().unwrap_or(0);
            let requirement = RoomRequirement {
                category: *category,
                case_total,
                rooms: estimate_rooms(case_total, *category, tiers),
            };
            (*category, requirement)
        })
        .collect()
}

// 1-based index of the first bound that holds the volume; past the last bound is the cap
fn tiered_rooms(total: u32, bounds: &[u32]) -> u32 {
    bounds
        .iter()
        .position(|bound| total <= *bound)
        .map(|idx| idx as u32 + 1)
        .unwrap_or(bounds.len() as u32 + 1)
}
