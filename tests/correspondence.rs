use piece_inspect::lowlevel::{corner_cost, edge_cost};
use piece_inspect::{
    correspond, Calibration, Corner, CornerMap, DetectedArea, Rotation, TemplateArea,
};
use rust_decimal::Decimal;

fn distances(values: [i64; 4]) -> CornerMap<Decimal> {
    CornerMap::from_fn(|c| Decimal::from(values[c.index()]))
}

fn template_area(id: usize, values: [i64; 4]) -> TemplateArea {
    let mut area = TemplateArea::empty(id);
    area.stats.mean.distance_px = distances(values);
    area
}

/// Detected area whose corners are relabelled as if the piece were turned
/// by `rotation`: the template corner `c` is seen at `c.clockwise(k)`.
fn turned(values: [i64; 4], rotation: Rotation) -> DetectedArea {
    let reference = distances(values);
    let back = 4 - rotation.steps();
    let seen = CornerMap::from_fn(|c| reference[c.clockwise(back)]);
    DetectedArea::new(0, 100, seen, &Calibration::default())
}

const A: [i64; 4] = [100, 140, 160, 120];
const B: [i64; 4] = [150, 90, 110, 170];
const C: [i64; 4] = [60, 200, 210, 80];

#[test]
fn single_area_recovers_every_rotation() {
    let template = [template_area(0, A)];
    for rotation in Rotation::ALL {
        let detected = [turned(A, rotation)];
        let result = correspond(&template, &detected);
        assert_eq!(result.rotation(), rotation);
        assert_eq!(result.assignments(), &[Some(0)]);
        assert_eq!(
            corner_cost(&detected[0], &template[0], rotation),
            Decimal::ZERO
        );
    }
}

#[test]
fn rotation_maps_template_corners_to_detected_ones() {
    let detected = turned(A, Rotation::Quarter);
    assert_eq!(detected.distance_px[Corner::TopRight], Decimal::from(100));
    assert_eq!(
        detected.distance_px_as(Rotation::Quarter, Corner::TopLeft),
        Decimal::from(100)
    );
}

#[test]
fn shuffled_areas_are_matched_under_rotation() {
    let template = [
        template_area(0, A),
        template_area(1, B),
        template_area(2, C),
    ];
    for rotation in Rotation::ALL {
        let detected = [
            turned(C, rotation),
            turned(A, rotation),
            turned(B, rotation),
        ];
        let result = correspond(&template, &detected);
        assert_eq!(result.rotation(), rotation);
        assert_eq!(result.assignments(), &[Some(2), Some(0), Some(1)]);
        assert!(result.missing(3).is_empty());
        assert_eq!(result.unexpected().count(), 0);
    }
}

#[test]
fn lead_areas_never_share_an_id() {
    // Both leads are closest to id 0; the second must settle for id 1.
    let template = [template_area(0, A), template_area(1, B)];
    let near_a = [105, 145, 165, 125];
    let detected = [
        turned(A, Rotation::Identity),
        turned(near_a, Rotation::Identity),
    ];
    let result = correspond(&template, &detected);
    assert_eq!(result.rotation(), Rotation::Identity);
    assert_eq!(result.assignments(), &[Some(0), Some(1)]);
}

#[test]
fn fewer_detected_areas_leave_ids_missing() {
    let template = [
        template_area(0, A),
        template_area(1, B),
        template_area(2, C),
    ];
    let detected = [turned(B, Rotation::Half), turned(C, Rotation::Half)];
    let result = correspond(&template, &detected);
    assert_eq!(result.rotation(), Rotation::Half);
    assert_eq!(result.assignments(), &[Some(1), Some(2)]);
    assert_eq!(result.missing(3), vec![0]);
}

#[test]
fn closer_extra_area_steals_an_id() {
    let template = [template_area(0, A), template_area(1, B)];
    let near_a = [105, 145, 165, 125];
    let detected = [
        turned(near_a, Rotation::Identity),
        turned(B, Rotation::Identity),
        turned(A, Rotation::Identity),
    ];
    let result = correspond(&template, &detected);
    assert_eq!(result.assignments(), &[None, Some(1), Some(0)]);
    assert_eq!(result.unexpected().collect::<Vec<_>>(), vec![0]);
    assert!(
        edge_cost(&detected[2], &template[0], Rotation::Identity)
            < edge_cost(&detected[0], &template[0], Rotation::Identity)
    );
}

#[test]
fn farther_extra_area_stays_unmatched() {
    let template = [template_area(0, A), template_area(1, B)];
    let far_b = [160, 100, 120, 180];
    let detected = [
        turned(A, Rotation::Identity),
        turned(B, Rotation::Identity),
        turned(far_b, Rotation::Identity),
    ];
    let result = correspond(&template, &detected);
    assert_eq!(result.assignments(), &[Some(0), Some(1), None]);
}

#[test]
fn empty_template_keeps_provisional_ids() {
    let mut detected = turned(A, Rotation::Identity);
    detected.id = 3;
    let result = correspond(&[], &[detected]);
    assert_eq!(result.rotation(), Rotation::Identity);
    assert_eq!(result.assignments(), &[Some(3)]);
}

#[test]
fn apply_writes_resolved_ids() {
    let template = [template_area(0, A), template_area(1, B)];
    let mut detected = vec![
        turned(B, Rotation::Identity),
        turned(A, Rotation::Identity),
        turned([500, 500, 500, 500], Rotation::Identity),
    ];
    let result = correspond(&template, &detected);
    result.apply(&mut detected);
    let ids: Vec<i64> = detected.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 0, -1]);
}
