//! Marker constants shared by the extraction strategies.

// CSS border-color classes the calendar grid uses to mark each discipline
pub const MARKER_WHEELIE: &str = "border-lime-600";
pub const MARKER_DRIFT: &str = "border-red-600";
pub const MARKER_OFFROAD: &str = "border-amber-500";
pub const MARKER_STOPPIE: &str = "border-blue-600";
pub const MARKER_ASPHALT: &str = "border-zinc-600";

// Cell text that flags a slot as promotional (the site renders either language)
pub const OFFER_MARKERS: [&str; 2] = ["Oferta", "Offer"];

/// Rendered when a slot carries no usable time information.
pub const UNKNOWN_TIME: &str = "??:??";

/// Map a grid cell style marker to its raw discipline token. `None` means
/// the cell carries no recognized discipline and is not a bookable slot.
pub fn marker_to_discipline(class: &str) -> Option<&'static str> {
    match class {
        MARKER_WHEELIE => Some("wheelie"),
        MARKER_DRIFT => Some("drift"),
        MARKER_OFFROAD => Some("offroad"),
        MARKER_STOPPIE => Some("stoppie"),
        MARKER_ASPHALT => Some("asphalt"),
        _ => None,
    }
}
