//! Tick pipeline - one simulated month
//!
//! Phases run strictly in order:
//! 1. Advance the calendar
//! 2. Fan out one unit per civilization (decide an action, step owned cells);
//!    units only read the world, the ordered collect is the join barrier
//! 3. Clear ownership of every cell flagged for removal
//! 4. Drain the action queue in FIFO order (expansion, war declarations)
//! 5. Fight one battle per active war and transfer territory on victory
//! 6. Publish the deduplicated change-set
//!
//! Phases 3 to 5 run on the calling thread and are the only places that
//! touch cell ownership, territories and frontiers.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::civilization::{Action, ActionRecord, Civilization};
use crate::core::config::SimulatorConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{CellId, CivId, Tick};
use crate::simulation::events::EventType;
use crate::simulation::output::ChangeSet;
use crate::simulation::territory_step::{step_cell, CellStep, GrowthRules};
use crate::simulation::world::{pair_mut, World};
use crate::territory::cell::SettlementTier;
use crate::territory::graph::TerritoryGraph;
use crate::war::{Belligerent, War};

/// What one civilization's unit of work observed
#[derive(Debug)]
struct CivilizationReport {
    civ: CivId,
    action: Option<ActionRecord>,
    steps: Vec<(CellId, CellStep)>,
    /// Cells still held by a dead civilization
    stale: Vec<CellId>,
}

/// Run a single tick.
///
/// A fault inside a civilization's unit aborts the tick before anything is
/// mutated; the calendar is left at the previous tick.
pub fn run_tick(world: &mut World, config: &SimulatorConfig) -> Result<ChangeSet> {
    let next_calendar = world.calendar.advanced()?;
    let tick = next_calendar.current_tick();

    let reports = observe_civilizations(world, tick, config)?;
    world.calendar = next_calendar;

    let mut changed = BTreeSet::new();
    let mut removals = BTreeMap::new();
    let mut actions = VecDeque::new();
    apply_reports(world, reports, &mut changed, &mut removals, &mut actions);

    clean_up_ownership(world, removals, &mut changed);
    resolve_actions(world, actions, tick, &mut changed);
    // Battle strength reads this tick's cell populations
    refresh_populations(world);
    resolve_wars(world, tick, &mut changed);
    settle_civilizations(world, tick);

    let change_set = ChangeSet::new(tick, changed);
    tracing::debug!(
        tick,
        changed = change_set.len(),
        wars = world.wars.len(),
        "tick complete"
    );
    Ok(change_set)
}

// === PHASE 2: PARALLEL OBSERVATION ===

fn observe_civilizations(
    world: &World,
    tick: Tick,
    config: &SimulatorConfig,
) -> Result<Vec<CivilizationReport>> {
    let rules = GrowthRules::from_config(config);
    let threshold = config.cell_parallel_threshold;
    let graph = &world.graph;

    // PARALLEL: each civilization only reads the shared graph
    world
        .civilizations
        .par_iter()
        .map(|civ| {
            panic::catch_unwind(AssertUnwindSafe(|| {
                observe_civilization(civ, graph, tick, &rules, threshold)
            }))
            .map_err(|payload| SimError::CivilizationTask {
                civ: civ.id,
                message: panic_message(payload.as_ref()),
            })
        })
        .collect()
}

fn observe_civilization(
    civ: &Civilization,
    graph: &TerritoryGraph,
    tick: Tick,
    rules: &GrowthRules,
    threshold: usize,
) -> CivilizationReport {
    if !civ.alive || !civ.has_territory() {
        return CivilizationReport {
            civ: civ.id,
            action: None,
            steps: Vec::new(),
            stale: civ.territory().iter().copied().collect(),
        };
    }

    let action = civ.determine_action(graph, tick);

    let step = |id: &CellId| (*id, step_cell(graph.cell(*id), rules));
    let steps: Vec<(CellId, CellStep)> = if civ.territory().len() >= threshold {
        civ.territory()
            .par_iter()
            .map(step)
            .filter(|(_, s)| *s != CellStep::Unchanged)
            .collect()
    } else {
        civ.territory()
            .iter()
            .map(step)
            .filter(|(_, s)| *s != CellStep::Unchanged)
            .collect()
    };

    CivilizationReport {
        civ: civ.id,
        action: Some(action),
        steps,
        stale: Vec::new(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Merge reports in civilization order: population updates land on the
/// graph, removals and actions are queued for the serial phases
fn apply_reports(
    world: &mut World,
    reports: Vec<CivilizationReport>,
    changed: &mut BTreeSet<CellId>,
    removals: &mut BTreeMap<CellId, CivId>,
    actions: &mut VecDeque<ActionRecord>,
) {
    for report in reports {
        for (id, step) in report.steps {
            match step {
                CellStep::Changed {
                    population,
                    settlement,
                } => {
                    let cell = world.graph.cell_mut(id);
                    cell.population = population;
                    cell.settlement = settlement;
                    changed.insert(id);
                }
                CellStep::Abandoned => {
                    removals.insert(id, report.civ);
                }
                CellStep::Unchanged => {}
            }
        }
        for id in report.stale {
            removals.insert(id, report.civ);
        }
        if let Some(action) = report.action {
            actions.push_back(action);
        }
    }
}

// === PHASE 3: OWNERSHIP CLEANUP ===

fn clean_up_ownership(
    world: &mut World,
    removals: BTreeMap<CellId, CivId>,
    changed: &mut BTreeSet<CellId>,
) {
    for (id, owner) in removals {
        let cell = world.graph.cell_mut(id);
        cell.population = 0;
        cell.settlement = SettlementTier::Tiny;
        world.civilizations[owner.index()].lose_cell(&mut world.graph, id);
        changed.insert(id);
    }
}

// === PHASE 4: ACTION RESOLUTION ===

fn resolve_actions(
    world: &mut World,
    actions: VecDeque<ActionRecord>,
    tick: Tick,
    changed: &mut BTreeSet<CellId>,
) {
    for record in actions {
        let civ = record.civ();
        match record.action() {
            Action::Expand { target } => {
                if !world.graph.contains(target) {
                    panic!("malformed action {record:?}: {target:?} is not on the map");
                }
                if world.civilizations[civ.index()].claim_cell(&mut world.graph, target) {
                    tracing::debug!(civ = ?civ, cell = ?target, tick, "expanded");
                    changed.insert(target);
                } else {
                    tracing::trace!(civ = ?civ, cell = ?target, "expansion target already owned");
                }
            }
            Action::Exterminate { target } => declare_war(world, civ, target, tick),
            Action::Exploit | Action::Explore | Action::DoNothing => {
                tracing::trace!(civ = ?civ, kind = ?record.kind(), "no territorial effect");
            }
        }
    }
}

fn declare_war(world: &mut World, attacker: CivId, defender: CivId, tick: Tick) {
    if attacker == defender || defender.index() >= world.civilizations.len() {
        panic!("malformed action: {attacker:?} cannot declare war on {defender:?}");
    }
    if !world.civilizations[defender.index()].alive {
        tracing::trace!(attacker = ?attacker, defender = ?defender, "war target already fallen");
        return;
    }
    if world.war_between(attacker, defender).is_some() {
        tracing::debug!(attacker = ?attacker, defender = ?defender, "already at war");
        return;
    }

    world.wars.push(War::new(attacker, defender));
    let (a, d) = pair_mut(&mut world.civilizations, attacker, defender);
    a.add_war(defender);
    d.add_war(attacker);
    world
        .history
        .add_event(EventType::WarDeclared { attacker, defender }, tick);
    tracing::info!(attacker = ?attacker, defender = ?defender, tick, "war declared");
}

// === PHASE 5: WAR RESOLUTION ===

fn resolve_wars(world: &mut World, tick: Tick, changed: &mut BTreeSet<CellId>) {
    let mut ended = Vec::new();

    for i in 0..world.wars.len() {
        let attacker = world.wars[i].attacker();
        let defender = world.wars[i].defender();
        let attacker_holds = world.civ(attacker).has_territory();
        let defender_holds = world.civ(defender).has_territory();

        let victory = if !attacker_holds || !defender_holds {
            // A side with nothing left to fight for forfeits
            if attacker_holds {
                Some((attacker, defender))
            } else {
                Some((defender, attacker))
            }
        } else {
            let attacker_side = Belligerent::of(world.civ(attacker));
            let defender_side = Belligerent::of(world.civ(defender));
            let report = world.wars[i].battle(attacker_side, defender_side, &mut world.rng);

            let (a, d) = pair_mut(&mut world.civilizations, attacker, defender);
            changed.extend(a.apply_casualties(&mut world.graph, report.casualties));
            changed.extend(d.apply_casualties(&mut world.graph, report.casualties));

            world.history.add_event(
                EventType::BattleFought {
                    attacker,
                    defender,
                    duration: report.duration,
                    result: report.result,
                    casualties: report.casualties,
                    outcome: report.outcome,
                },
                tick,
            );
            tracing::debug!(
                attacker = ?attacker,
                defender = ?defender,
                roll = report.roll,
                result = report.result,
                outcome = ?report.outcome,
                "battle"
            );
            world.wars[i].victor(report.outcome)
        };

        if let Some((winner, loser)) = victory {
            let cells = world.wars[i].result_cells(world.civ(loser));
            let (w, l) = pair_mut(&mut world.civilizations, winner, loser);
            for &id in &cells {
                l.lose_cell(&mut world.graph, id);
                if w.claim_cell(&mut world.graph, id) {
                    changed.insert(id);
                }
            }
            w.remove_war(loser);
            l.remove_war(winner);

            world.history.add_event(
                EventType::WarEnded {
                    attacker,
                    defender,
                    victor: winner,
                    cells_transferred: cells.len(),
                },
                tick,
            );
            tracing::info!(
                winner = ?winner,
                loser = ?loser,
                cells = cells.len(),
                tick,
                "war ended"
            );
            ended.push(i);
        }
    }

    let mut index = 0;
    world.wars.retain(|_| {
        let keep = !ended.contains(&index);
        index += 1;
        keep
    });
}

fn refresh_populations(world: &mut World) {
    for civ in &mut world.civilizations {
        civ.refresh_population(&world.graph);
    }
}

/// Refresh populations and retire civilizations left without territory,
/// ending every war they are still part of
fn settle_civilizations(world: &mut World, tick: Tick) {
    refresh_populations(world);

    for i in 0..world.civilizations.len() {
        let civ = &mut world.civilizations[i];
        if !civ.alive || civ.has_territory() {
            continue;
        }
        civ.alive = false;
        let fallen = civ.id;
        tracing::info!(civ = ?fallen, name = %civ.name, tick, "civilization collapsed");
        world
            .history
            .add_event(EventType::CivilizationCollapsed { civ: fallen }, tick);
        end_wars_of(world, fallen, tick);
    }
}

fn end_wars_of(world: &mut World, fallen: CivId, tick: Tick) {
    let mut remaining = Vec::with_capacity(world.wars.len());
    for war in std::mem::take(&mut world.wars) {
        let Some(victor) = war.opponent_of(fallen) else {
            remaining.push(war);
            continue;
        };
        let (w, l) = pair_mut(&mut world.civilizations, victor, fallen);
        w.remove_war(fallen);
        l.remove_war(victor);
        world.history.add_event(
            EventType::WarEnded {
                attacker: war.attacker(),
                defender: war.defender(),
                victor,
                cells_transferred: 0,
            },
            tick,
        );
        tracing::info!(winner = ?victor, loser = ?fallen, tick, "war ended by collapse");
    }
    world.wars = remaining;
}
