//! Text rendering of the two screens.

use std::fmt::Write;

use crate::compass::direction_16point;
use crate::position::ReferencePoint;
use crate::spotter::Readout;
use crate::watchdog::StalenessReport;

pub fn render_set_location(reference: Option<ReferencePoint>) -> String {
    let mut out = String::from("== Set Location ==\n");

    match reference {
        Some(reference) => {
            let _ = writeln!(out, "Latitude: {:.6}", reference.latitude);
            let _ = writeln!(out, "Longitude: {:.6}", reference.longitude);
        }
        None => out.push_str("Location not set\n"),
    }
    out
}

pub fn render_distance(readout: &Readout) -> String {
    let mut out = String::from("== Distance ==\n");

    let Some(position) = readout.position else {
        out.push_str("Waiting for GPS data...\n");
        return out;
    };

    match readout.distance_miles {
        Some(miles) => {
            let _ = writeln!(out, "Distance: {:.3} miles", miles);
        }
        None => out.push_str("Distance: -- (no reference set)\n"),
    }

    match readout.heading {
        Some(heading) => {
            let _ = writeln!(out, "Heading: {:.0}° ({})", heading, direction_16point(heading));
        }
        None => out.push_str("Heading: --\n"),
    }

    if let Some(bearing) = readout.bearing_from_reference {
        let _ = writeln!(
            out,
            "From target: {:.0}° ({})",
            bearing,
            direction_16point(bearing)
        );
    }

    let _ = writeln!(out, "Position: {}", position);

    if let StalenessReport::Stale(elapsed) = readout.staleness {
        let _ = writeln!(out, "No course for {:.0}s", elapsed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn readout() -> Readout {
        Readout {
            reference: Some(ReferencePoint::new(0.0, 0.0)),
            position: Some(Position::new(0.009, 0.0)),
            distance_miles: Some(0.62184),
            heading: Some(85.0),
            bearing_from_reference: Some(0.0),
            staleness: StalenessReport::Fresh,
        }
    }

    #[test]
    fn test_set_location_screen() {
        assert_eq!(
            render_set_location(Some(ReferencePoint::new(48.1173, 11.516667))),
            "== Set Location ==\nLatitude: 48.117300\nLongitude: 11.516667\n"
        );
        assert_eq!(
            render_set_location(None),
            "== Set Location ==\nLocation not set\n"
        );
    }

    #[test]
    fn test_distance_screen() {
        let screen = render_distance(&readout());
        assert_eq!(
            screen,
            "== Distance ==\n\
             Distance: 0.622 miles\n\
             Heading: 85° (E)\n\
             From target: 0° (N)\n\
             Position: (0.009000°, 0.000000°)\n"
        );
    }

    #[test]
    fn test_waiting_for_data() {
        let readout = Readout {
            position: None,
            distance_miles: None,
            bearing_from_reference: None,
            ..readout()
        };
        assert_eq!(
            render_distance(&readout),
            "== Distance ==\nWaiting for GPS data...\n"
        );
    }

    #[test]
    fn test_partial_data_and_staleness() {
        let readout = Readout {
            reference: None,
            distance_miles: None,
            heading: None,
            bearing_from_reference: None,
            staleness: StalenessReport::Stale(7.2),
            ..readout()
        };
        let screen = render_distance(&readout);

        assert!(screen.contains("Distance: -- (no reference set)\n"));
        assert!(screen.contains("Heading: --\n"));
        assert!(!screen.contains("From target"));
        assert!(screen.ends_with("No course for 7s\n"));
    }
}
