//! Collision detection and response
//!
//! Every test is an axis-aligned overlap against the player rectangle. The
//! disabled flag on an obstacle is checked before anything else, so each
//! obstacle pays out (or hurts) at most once.

use glam::Vec2;

use super::schedule::ScheduledEvent;
use super::scoring::{award, break_combo, reward_combo};
use super::state::{ActiveLog, Entity, GameEvent, GameState, ParticleKind, PowerupKind, Rect};
use crate::audio::AudioCue;
use crate::config::GameConfig;

/// Strict AABB overlap; touching edges do not collide
#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// What happened this tick (for tests and debug logging)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub hits: u32,
    pub scans: u32,
    pub pickups: u32,
    pub logs: u32,
    pub emp_disables: u32,
}

/// Resolve every player contact plus EMP area effects
pub fn resolve_collisions(state: &mut GameState, config: &GameConfig) -> CollisionReport {
    let mut report = CollisionReport::default();
    resolve_emps(state, config, &mut report);
    resolve_obstacles(state, config, &mut report);
    resolve_powerups(state, config, &mut report);
    resolve_data_logs(state, config, &mut report);
    report
}

fn resolve_obstacles(state: &mut GameState, config: &GameConfig, report: &mut CollisionReport) {
    for index in 0..state.obstacles.len() {
        let obstacle = &state.obstacles[index];
        if obstacle.is_disabled()
            || obstacle.is_marked()
            || !aabb_overlap(&state.player.rect, &obstacle.rect)
        {
            continue;
        }

        if state.player.can_scan() {
            // Phasing or shielded: convert the contact into a reward
            if !state.obstacles[index].disable() {
                continue;
            }
            let value = state.obstacles[index].score_value;
            let at = state.obstacles[index].rect.center();
            state.player.add_energy(config.energy.scan_reward);
            let points = award(state, value);
            reward_combo(&mut state.player, &config.combat);
            state.spawn_popup(format!("+{points:.0}"), at);
            state.emit_particles(ParticleKind::Glitch, at, 10);
            state.cue(AudioCue::Scan);
            report.scans += 1;
        } else if state.player.is_invincible() {
            // Post-hit grace: no damage, no scan
        } else {
            let left = state.player.apply_damage(config.combat.collision_damage);
            state.player.invincible_timer = config.combat.hit_invincibility_secs;
            let at = state.player.rect.pos + Vec2::new(20.0, 10.0);
            if break_combo(&mut state.player) {
                state.spawn_popup("COMBO BROKEN", at);
            }
            state.emit_particles(ParticleKind::Spark, at, 15);
            state.emit_particles(ParticleKind::Smoke, at, 8);
            state.cue(AudioCue::Damage);
            log::debug!(
                "Hit {} #{}, integrity {:.0}",
                state.obstacles[index].kind.obstacle_type().as_str(),
                state.obstacles[index].id,
                left
            );
            report.hits += 1;
        }
    }
}

fn resolve_powerups(state: &mut GameState, config: &GameConfig, report: &mut CollisionReport) {
    for index in 0..state.powerups.len() {
        let powerup = &mut state.powerups[index];
        if powerup.is_marked() || !aabb_overlap(&state.player.rect, &powerup.rect) {
            continue;
        }
        powerup.mark_for_deletion();
        let kind = powerup.kind;
        let at = powerup.rect.center();

        let effects = &config.powerups;
        let player = &mut state.player;
        match kind {
            PowerupKind::Charge => player.energy = player.max_energy,
            PowerupKind::Repair => player.repair(effects.repair_amount),
            PowerupKind::Shield => player.shield_timer = effects.shield_secs,
            PowerupKind::Overclock => player.overclock_timer = effects.overclock_secs,
            PowerupKind::GodMode => {
                player.shield_timer = player.shield_timer.max(effects.god_mode_secs);
                state.score += effects.god_mode_bonus as f64;
            }
        }

        state.spawn_popup(kind.label(), at);
        state.emit_particles(ParticleKind::Spark, at, 10);
        state.cue(AudioCue::PowerUp);
        log::debug!("Collected {}", kind.label());
        report.pickups += 1;
    }
}

fn resolve_data_logs(state: &mut GameState, config: &GameConfig, report: &mut CollisionReport) {
    for index in 0..state.data_logs.len() {
        let data_log = &mut state.data_logs[index];
        if data_log.is_marked() || !aabb_overlap(&state.player.rect, &data_log.rect) {
            continue;
        }
        data_log.mark_for_deletion();
        let message = data_log.message.clone();

        let serial = state.next_log_serial();
        state.schedule.push(
            state.time + config.narrative.log_secs as f64,
            ScheduledEvent::ExpireLog { serial },
        );
        state.active_log = Some(ActiveLog {
            serial,
            message: message.clone(),
        });
        state.push_event(GameEvent::LogOpened { message });
        state.cue(AudioCue::CollectData);
        report.logs += 1;
    }
}

/// Disable every live obstacle whose centre is inside an EMP pulse
fn resolve_emps(state: &mut GameState, config: &GameConfig, report: &mut CollisionReport) {
    for e in 0..state.emps.len() {
        let center = state.emps[e].rect.center();
        let radius = state.emps[e].radius;
        for o in 0..state.obstacles.len() {
            let obstacle = &mut state.obstacles[o];
            if obstacle.rect.center().distance(center) >= radius || !obstacle.disable() {
                continue;
            }
            let at = obstacle.rect.center();
            state.score += config.energy.emp_disable_score as f64;
            state.emit_particles(ParticleKind::Glitch, at, 10);
            report.emp_disables += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{DataLog, EmpBurst, Obstacle, ObstacleKind, Powerup};

    fn setup() -> (GameState, GameConfig) {
        let config = GameConfig::default();
        let state = GameState::new(&config, 42);
        (state, config)
    }

    /// Obstacle sitting right on top of the player
    fn obstacle_on_player(state: &mut GameState, score_value: u32) {
        let id = state.next_entity_id();
        let rect = Rect::centered(state.player.rect.center(), Vec2::splat(40.0));
        state
            .obstacles
            .push(Obstacle::new(id, rect, ObstacleKind::ServerTower, score_value));
    }

    #[test]
    fn test_aabb_edges_do_not_touch() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!aabb_overlap(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!aabb_overlap(&a, &Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_undefended_hit() {
        let (mut state, config) = setup();
        state.player.combo = 3;
        obstacle_on_player(&mut state, 100);

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.hits, 1);
        assert_eq!(state.player.integrity, 80.0);
        assert_eq!(state.player.energy, 100.0);
        assert_eq!(state.player.combo, 1);
        assert!(state.player.is_invincible());
        assert!(state.popups.iter().any(|p| p.text == "COMBO BROKEN"));
        assert!(!state.obstacles[0].is_disabled());
    }

    #[test]
    fn test_grace_window_blocks_repeat_damage() {
        let (mut state, config) = setup();
        obstacle_on_player(&mut state, 100);
        resolve_collisions(&mut state, &config);
        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.hits, 0);
        assert_eq!(report.scans, 0);
        assert_eq!(state.player.integrity, 80.0);
    }

    #[test]
    fn test_phasing_scan_pays_once() {
        let (mut state, config) = setup();
        state.player.phasing = true;
        state.player.combo = 2;
        state.player.energy = 50.0;
        obstacle_on_player(&mut state, 100);

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.scans, 1);
        assert_eq!(state.score, 200.0);
        assert_eq!(state.player.energy, 50.0 + config.energy.scan_reward);
        assert_eq!(state.player.combo, 3);
        assert!(state.obstacles[0].is_disabled());
        assert_eq!(state.player.integrity, 100.0);

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report, CollisionReport::default());
        assert_eq!(state.score, 200.0);
    }

    #[test]
    fn test_scan_reward_energy_is_capped() {
        let (mut state, config) = setup();
        state.player.shield_timer = 1.0;
        obstacle_on_player(&mut state, 50);
        resolve_collisions(&mut state, &config);
        assert_eq!(state.player.energy, state.player.max_energy);
    }

    #[test]
    fn test_disabled_obstacle_is_harmless() {
        let (mut state, config) = setup();
        obstacle_on_player(&mut state, 100);
        state.obstacles[0].disable();
        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report, CollisionReport::default());
        assert_eq!(state.player.integrity, 100.0);
    }

    #[test]
    fn test_powerup_consumed_on_first_contact() {
        let (mut state, config) = setup();
        state.player.integrity = 50.0;
        let rect = Rect::centered(state.player.rect.center(), Vec2::splat(40.0));
        state.powerups.push(Powerup::new(7, rect, PowerupKind::Repair));

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.pickups, 1);
        assert_eq!(state.player.integrity, 50.0 + config.powerups.repair_amount);

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.pickups, 0);
        state.compact();
        assert!(state.powerups.is_empty());
    }

    #[test]
    fn test_god_mode_bonus_and_shield() {
        let (mut state, config) = setup();
        let rect = Rect::centered(state.player.rect.center(), Vec2::splat(40.0));
        state.powerups.push(Powerup::new(7, rect, PowerupKind::GodMode));
        resolve_collisions(&mut state, &config);
        assert_eq!(state.score, config.powerups.god_mode_bonus as f64);
        assert!(state.player.is_shielded());
    }

    #[test]
    fn test_data_log_fills_active_slot() {
        let (mut state, config) = setup();
        let rect = Rect::centered(state.player.rect.center(), Vec2::new(30.0, 20.0));
        state
            .data_logs
            .push(DataLog::new(9, rect, "LOG 0001".into(), false));

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.logs, 1);
        assert_eq!(state.active_log.as_ref().map(|l| l.message.as_str()), Some("LOG 0001"));
        assert_eq!(state.schedule.len(), 1);
        assert!(state
            .drain_events()
            .contains(&GameEvent::LogOpened { message: "LOG 0001".into() }));
    }

    #[test]
    fn test_emp_disables_in_radius_once() {
        let (mut state, config) = setup();
        let near = Rect::centered(Vec2::new(300.0, 300.0), Vec2::splat(40.0));
        let far = Rect::centered(Vec2::new(1000.0, 300.0), Vec2::splat(40.0));
        state.obstacles.push(Obstacle::new(1, near, ObstacleKind::ServerTower, 100));
        state.obstacles.push(Obstacle::new(2, far, ObstacleKind::ServerTower, 100));
        let mut emp = EmpBurst::new(3, Vec2::new(200.0, 300.0), config.energy.emp_radius);
        emp.expand(200.0);
        state.emps.push(emp);

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.emp_disables, 1);
        assert!(state.obstacles[0].is_disabled());
        assert!(!state.obstacles[1].is_disabled());
        assert_eq!(state.score, config.energy.emp_disable_score as f64);
        assert_eq!(state.player.combo, 1);

        let report = resolve_collisions(&mut state, &config);
        assert_eq!(report.emp_disables, 0);
    }
}
