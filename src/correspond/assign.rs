//! Rotation disambiguation and greedy id assignment.

use rust_decimal::Decimal;

use super::cost::{corner_cost, edge_cost};
use super::{Correspondence, Rotation};
use crate::sample::DetectedArea;
use crate::template::TemplateArea;
use crate::trace::{trace_debug, trace_event, trace_span};

/// Resolves the rotation and template ids of `detected` against `template`.
///
/// * No template areas: provisional ids are kept under the identity rotation.
/// * One template area: the rotation minimising the four-corner cost of the
///   first detected area wins and that area takes the template id.
/// * Two or more: the first two detected areas are matched jointly. For each
///   rotation the cheapest pair of distinct template areas is found; the
///   rotation with the lowest combined cost is kept. Remaining detected areas
///   then greedily claim the nearest unclaimed template area by the
///   top-left/bottom-left cost.
///
/// When more areas are detected than the template holds, each extra area is
/// compared against the full template list and takes over an id from its
/// current holder if strictly closer; the holder becomes unmatched.
///
/// Ties always go to the earliest rotation and the lowest template id.
pub fn correspond(template: &[TemplateArea], detected: &[DetectedArea]) -> Correspondence {
    let _guard = trace_span!(
        "correspond",
        template_areas = template.len(),
        detected_areas = detected.len()
    )
    .entered();

    if template.is_empty() {
        return Correspondence::provisional(detected);
    }
    if detected.is_empty() {
        return Correspondence::new(Rotation::Identity, Vec::new());
    }

    let mut sorted: Vec<&TemplateArea> = template.iter().collect();
    sorted.sort_by_key(|area| area.id);

    let mut assignments = vec![None; detected.len()];
    let rotation = if sorted.len() == 1 {
        let rotation = single_rotation(&detected[0], sorted[0]);
        assignments[0] = Some(sorted[0].id);
        rotation
    } else {
        let mut pool = sorted.clone();
        let lead_len = detected.len().min(2);
        let lead = lead_match(&pool, &detected[..lead_len]);
        for (slot, &pool_idx) in lead.picks.iter().enumerate() {
            assignments[slot] = Some(pool[pool_idx].id);
        }
        let mut picks = lead.picks.clone();
        picks.sort_unstable_by(|a, b| b.cmp(a));
        for pool_idx in picks {
            pool.remove(pool_idx);
        }

        for (idx, area) in detected.iter().enumerate().skip(lead_len) {
            let costs = pool.iter().map(|tpl| edge_cost(area, tpl, lead.rotation));
            let Some((pool_idx, _)) = argmin(costs) else {
                break;
            };
            assignments[idx] = Some(pool[pool_idx].id);
            pool.remove(pool_idx);
        }
        lead.rotation
    };

    if detected.len() > sorted.len() {
        reclaim(&sorted, detected, &mut assignments, rotation);
    }

    trace_event!(
        "correspondence",
        rotation_steps = rotation.steps(),
        matched = assignments.iter().filter(|id| id.is_some()).count()
    );
    Correspondence::new(rotation, assignments)
}

/// Joint choice for the first detected areas.
struct LeadMatch {
    rotation: Rotation,
    /// Index into the candidate pool for each lead area.
    picks: Vec<usize>,
    cost: Decimal,
}

fn single_rotation(detected: &DetectedArea, template: &TemplateArea) -> Rotation {
    let costs = Rotation::ALL
        .iter()
        .map(|&rotation| corner_cost(detected, template, rotation));
    let (idx, cost) = argmin(costs).unwrap_or((0, Decimal::ZERO));
    trace_debug!("single-area rotation {} with cost {}", idx, cost);
    Rotation::from_steps(idx)
}

fn lead_match(pool: &[&TemplateArea], lead: &[DetectedArea]) -> LeadMatch {
    let mut best: Option<LeadMatch> = None;
    for rotation in Rotation::ALL {
        let costs: Vec<Vec<Decimal>> = lead
            .iter()
            .map(|area| pool.iter().map(|tpl| corner_cost(area, tpl, rotation)).collect())
            .collect();
        let candidate = match costs.as_slice() {
            [first] => argmin(first.iter().copied()).map(|(idx, cost)| LeadMatch {
                rotation,
                picks: vec![idx],
                cost,
            }),
            [first, second] => best_pair(first, second).map(|(i, j, cost)| LeadMatch {
                rotation,
                picks: vec![i, j],
                cost,
            }),
            _ => None,
        };
        let Some(candidate) = candidate else {
            continue;
        };
        trace_debug!(
            "rotation {} lead cost {}",
            rotation.steps(),
            candidate.cost
        );
        if best.as_ref().map_or(true, |b| candidate.cost < b.cost) {
            best = Some(candidate);
        }
    }
    best.unwrap_or(LeadMatch {
        rotation: Rotation::Identity,
        picks: Vec::new(),
        cost: Decimal::ZERO,
    })
}

/// Cheapest `(i, j)` with `i != j` minimising `first[i] + second[j]`.
fn best_pair(first: &[Decimal], second: &[Decimal]) -> Option<(usize, usize, Decimal)> {
    let mut best: Option<(usize, usize, Decimal)> = None;
    for (i, a) in first.iter().enumerate() {
        for (j, b) in second.iter().enumerate() {
            if i == j {
                continue;
            }
            let cost = *a + *b;
            if best.map_or(true, |(_, _, c)| cost < c) {
                best = Some((i, j, cost));
            }
        }
    }
    best
}

fn reclaim(
    sorted: &[&TemplateArea],
    detected: &[DetectedArea],
    assignments: &mut [Option<usize>],
    rotation: Rotation,
) {
    for extra in sorted.len()..detected.len() {
        let costs = sorted
            .iter()
            .map(|tpl| edge_cost(&detected[extra], tpl, rotation));
        let Some((tpl_idx, cost)) = argmin(costs) else {
            return;
        };
        let id = sorted[tpl_idx].id;
        match assignments.iter().position(|held| *held == Some(id)) {
            None => assignments[extra] = Some(id),
            Some(holder) if holder == extra => {}
            Some(holder) => {
                let held_cost = edge_cost(&detected[holder], sorted[tpl_idx], rotation);
                if cost < held_cost {
                    trace_debug!("area {} takes id {} from area {}", extra, id, holder);
                    assignments[holder] = None;
                    assignments[extra] = Some(id);
                }
            }
        }
    }
}

/// First index holding the strict minimum.
fn argmin(values: impl IntoIterator<Item = Decimal>) -> Option<(usize, Decimal)> {
    let mut best: Option<(usize, Decimal)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        if best.map_or(true, |(_, b)| value < b) {
            best = Some((idx, value));
        }
    }
    best
}
