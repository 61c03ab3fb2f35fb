//! Integration tests driving whole runs through the public command surface.

use gloomcrawl::{
    Command, DiceType, Direction, GameConfig, GameRng, GameState, GeneratedLevel, Item, ItemKind,
    Merchant, Monster, MonsterKey, PointOfAction, Position, Room, RunStatus, ScriptedRandom,
    SpecialAttack, TileType, TurnPhase,
};

const SPAWN: Position = Position { x: 2, y: 3 };

/// A 10x10 room with the player at (2, 2) and one monster directly below.
fn level_with(monster: Monster, spawn: Position) -> GeneratedLevel {
    let mut room = Room::walled(10, 10);
    room.start = Position::new(2, 2);
    room.set_tile(spawn, TileType::MonsterSpawn);
    GeneratedLevel {
        room,
        spawns: vec![(MonsterKey::new(0, spawn), monster)],
    }
}

fn crawler(health: u32, attack: u32) -> Monster {
    Monster::new("Rust Crawler", health, attack, DiceType::D6, "crawler.png", vec![])
}

/// Starts a run; the first two draws are the enemy's heading and the
/// merchant roll.
fn start(config: GameConfig, level: GeneratedLevel, draws: Vec<f64>) -> GameState {
    let mut rng = ScriptedRandom::new(vec![ScriptedRandom::pick(0, 4), ScriptedRandom::FAIL]);
    rng.push(draws);
    GameState::from_level(config, level, Box::new(rng)).unwrap()
}

fn no_merchant(mut config: GameConfig) -> GameConfig {
    config.generation.merchant_chance = 0;
    config
}

fn step_down_into_battle(state: &mut GameState) {
    assert!(state.attempt_move(Direction::Down).unwrap());
    assert_eq!(state.player_position, Position::new(2, 2));
    assert!(state.attempt_move(Direction::Down).unwrap());
    assert_eq!(state.player_position, SPAWN);
    assert!(state.in_combat());
}

#[test]
fn test_timed_combat_round() {
    let mut state = start(
        no_merchant(GameConfig::new()),
        level_with(crawler(42, 1), SPAWN),
        vec![ScriptedRandom::face(10, 20), ScriptedRandom::face(4, 6)],
    );
    step_down_into_battle(&mut state);
    assert_eq!(state.log.latest(), Some("A Rust Crawler appears!"));

    assert!(!state.attempt_move(Direction::Left).unwrap());
    assert_eq!(state.log.latest(), Some("You cannot move during combat."));

    assert!(state.attempt_attack().unwrap());
    assert!(!state.attempt_attack().unwrap());
    assert_eq!(state.log.latest(), Some("Wait for your turn."));

    state.advance_time(349).unwrap();
    assert_eq!(
        state.battle.as_ref().map(|b| b.phase),
        Some(TurnPhase::PlayerRolling { remaining_ms: 1 })
    );
    assert_eq!(state.battle_monster().unwrap().health, 42);

    state.advance_time(1).unwrap();
    assert_eq!(state.battle_monster().unwrap().health, 31);
    assert!(state.log.contains("You dealt 11 damage to Rust Crawler."));
    assert_eq!(
        state.battle.as_ref().map(|b| b.phase),
        Some(TurnPhase::EnemyWindup { remaining_ms: 1000 })
    );

    state.advance_time(1000).unwrap();
    assert_eq!(
        state.battle.as_ref().map(|b| b.phase),
        Some(TurnPhase::EnemyRolling { remaining_ms: 350 })
    );
    assert_eq!(state.player.health, 100);

    state.advance_time(350).unwrap();
    assert_eq!(state.player.health, 95);
    assert_eq!(state.log.latest(), Some("Rust Crawler dealt 5 damage to you!"));
    assert_eq!(state.battle.as_ref().map(|b| b.phase), Some(TurnPhase::AwaitingPlayer));
    assert_eq!(state.elapsed_ms, 1700);
}

#[test]
fn test_resolve_pending_combat_skips_timers() {
    let mut state = start(
        no_merchant(GameConfig::new()),
        level_with(crawler(42, 1), SPAWN),
        vec![ScriptedRandom::face(1, 20), ScriptedRandom::face(1, 6)],
    );
    step_down_into_battle(&mut state);
    let enemy_before = state.room().unwrap().enemies[0].clone();

    state.execute(Command::Attack).unwrap();
    state.resolve_pending_combat().unwrap();

    assert!(state.log.contains("You missed!"));
    assert_eq!(state.log.latest(), Some("Rust Crawler missed!"));
    assert_eq!(state.battle.as_ref().map(|b| b.phase), Some(TurnPhase::AwaitingPlayer));
    assert_eq!(state.elapsed_ms, 350 + 1000 + 350);
    assert_eq!(state.room().unwrap().enemies[0], enemy_before);
}

#[test]
fn test_special_attack_replaces_roll() {
    let monster = Monster::new(
        "Rust Crawler",
        42,
        1,
        DiceType::D6,
        "crawler.png",
        vec![SpecialAttack::new("Magma Slam", 30, 12)],
    );
    let mut state = start(
        GameConfig::for_testing(),
        level_with(monster, SPAWN),
        vec![ScriptedRandom::face(5, 20), ScriptedRandom::PASS],
    );
    step_down_into_battle(&mut state);

    state.attempt_attack().unwrap();
    assert_eq!(state.battle_monster().unwrap().health, 36);
    assert_eq!(state.player.health, 88);
    assert_eq!(
        state.log.latest(),
        Some("Rust Crawler used Magma Slam and dealt 12 damage to you!")
    );
    assert_eq!(state.battle.as_ref().map(|b| b.phase), Some(TurnPhase::AwaitingPlayer));
}

#[test]
fn test_special_attack_reports_damage_taken() {
    let monster = Monster::new(
        "Rust Crawler",
        42,
        1,
        DiceType::D6,
        "crawler.png",
        vec![SpecialAttack::new("Magma Slam", 30, 12)],
    );
    let mut state = start(
        GameConfig::for_testing(),
        level_with(monster, SPAWN),
        vec![ScriptedRandom::face(5, 20), ScriptedRandom::PASS],
    );
    step_down_into_battle(&mut state);
    state.player.health = 5;

    state.attempt_attack().unwrap();
    assert_eq!(state.player.health, 0);
    assert_eq!(state.status, RunStatus::Defeated);
    assert!(state.log.contains("Rust Crawler used Magma Slam and dealt 5 damage to you!"));
    assert!(!state.log.contains("dealt 12 damage to you"));
}

#[test]
fn test_heal_item_takes_the_turn() {
    let mut state = start(
        GameConfig::for_testing(),
        level_with(crawler(42, 1), SPAWN),
        vec![ScriptedRandom::face(1, 6)],
    );
    step_down_into_battle(&mut state);
    state.player.health = 50;
    let bandage = state.player.inventory[0].id;

    assert!(state.use_item(bandage).unwrap());
    assert_eq!(state.player.health, 70);
    assert!(state.player.inventory.is_empty());
    assert!(state.log.contains("You used Bandage and healed 20 health!"));
    assert_eq!(state.log.latest(), Some("Rust Crawler missed!"));

    assert!(!state.use_item(bandage).unwrap());
    assert_eq!(state.log.latest(), Some("You don't have that item."));
}

#[test]
fn test_attack_item_deals_fixed_damage_in_battle() {
    let mut state = start(
        GameConfig::for_testing(),
        level_with(crawler(42, 1), SPAWN),
        vec![ScriptedRandom::face(1, 6)],
    );
    let first = Item::new("grenade", ItemKind::Attack, 25, PointOfAction::Active);
    let second = Item::new("grenade", ItemKind::Attack, 25, PointOfAction::Active);
    let (first_id, second_id) = (first.id, second.id);
    state.player.inventory.push(first);
    state.player.inventory.push(second);

    assert!(!state.use_item(first_id).unwrap());
    assert_eq!(state.log.latest(), Some("There is nothing to use the grenade on."));
    assert_eq!(state.player.inventory.len(), 3);

    step_down_into_battle(&mut state);

    // The only scripted draw is the crawler's die; a player roll would eat it.
    assert!(state.use_item(first_id).unwrap());
    assert_eq!(state.battle_monster().unwrap().health, 17);
    assert!(state.log.contains("You dealt 25 damage to Rust Crawler."));
    assert_eq!(state.log.latest(), Some("Rust Crawler missed!"));
    assert_eq!(state.player.health, 100);
    assert!(state.player.find_item(first_id).is_none());
    assert_eq!(state.battle.as_ref().map(|b| b.phase), Some(TurnPhase::AwaitingPlayer));

    assert!(state.use_item(second_id).unwrap());
    assert!(!state.in_combat());
    assert_eq!(state.total_defeated, 1);
    assert_eq!(state.player.inventory.len(), 1);
    assert_eq!(state.player.health, 100);
    let enemy_turns = state
        .log
        .recent()
        .filter(|message| message.starts_with("Rust Crawler missed"))
        .count();
    assert_eq!(enemy_turns, 1);
    assert!(state.room().unwrap().exit_placed);
}

#[test]
fn test_clearing_room_opens_exit_once() {
    let mut state = start(
        GameConfig::for_testing(),
        level_with(crawler(5, 1), SPAWN),
        vec![ScriptedRandom::face(10, 20)],
    );
    step_down_into_battle(&mut state);

    state.attempt_attack().unwrap();
    assert!(!state.in_combat());
    assert_eq!(state.total_defeated, 1);
    assert_eq!(state.player.experience, 1);
    assert!(state.room().unwrap().enemies.is_empty());
    assert!(state.log.contains("Rust Crawler is defeated!"));
    assert!(state.log.contains("Nothing found."));

    state.conclude_combat();
    state.conclude_combat();

    let room = state.room().unwrap();
    assert!(room.exit_placed);
    let exits = room.positions_of(TileType::ExitDoor);
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].y, 9);
    let opened = state
        .log
        .recent()
        .filter(|message| *message == "The way forward is open.")
        .count();
    assert_eq!(opened, 1);
}

#[test]
fn test_defeat_halts_the_run() {
    let mut state = start(
        GameConfig::for_testing(),
        level_with(crawler(42, 5), SPAWN),
        vec![ScriptedRandom::face(1, 20), ScriptedRandom::face(3, 6)],
    );
    step_down_into_battle(&mut state);
    state.player.health = 3;

    state.attempt_attack().unwrap();
    assert_eq!(state.status, RunStatus::Defeated);
    assert_eq!(state.player.health, 0);
    assert!(!state.in_combat());
    assert!(state.log.contains("You have been defeated!"));
    assert_eq!(
        state.log.latest(),
        Some("Game Over! You defeated 0 monsters and reached level 1!")
    );
    assert!(!state.room().unwrap().exit_placed);

    let enemy_before = state.room().unwrap().enemies[0].clone();
    assert!(!state.attempt_move(Direction::Up).unwrap());
    assert_eq!(state.log.latest(), Some("The run is over."));
    assert!(!state.attempt_attack().unwrap());
    state.advance_time(200).unwrap();
    assert_eq!(state.room().unwrap().enemies[0], enemy_before);
}

#[test]
fn test_final_door_wins_without_new_level() {
    let mut config = GameConfig::for_testing();
    config.max_dungeon_levels = 1;
    let mut level = level_with(crawler(42, 1), Position::new(7, 7));
    level.room.set_tile(Position::new(2, 3), TileType::ExitDoor);
    let mut state = start(config, level, vec![]);

    state.attempt_move(Direction::Down).unwrap();
    state.attempt_move(Direction::Down).unwrap();

    assert_eq!(state.status, RunStatus::Victory);
    assert_eq!(state.log.latest(), Some("You have completed all levels! You Win!"));
    assert_eq!(state.rooms.len(), 1);
    assert_eq!(state.current_level, 1);
    assert!(!state.attempt_move(Direction::Down).unwrap());
}

#[test]
fn test_door_leads_to_next_level() {
    let mut level = level_with(crawler(42, 1), Position::new(7, 7));
    level.room.set_tile(Position::new(2, 3), TileType::ExitDoor);
    let mut state = start(GameConfig::for_testing(), level, vec![]);
    state.set_random_source(Box::new(GameRng::new(77)));

    state.attempt_move(Direction::Down).unwrap();
    state.attempt_move(Direction::Left).unwrap();
    state.attempt_move(Direction::Down).unwrap();
    assert_eq!(state.current_level, 1);
    assert_eq!(state.player_position, Position::new(2, 2));

    state.attempt_move(Direction::Down).unwrap();
    assert_eq!(state.current_level, 2);
    assert_eq!(state.rooms.len(), 2);
    assert!(state.log.contains("You proceed to level 2!"));
    assert_eq!(state.player_position, state.rooms[1].start);
    assert_eq!(state.facing, Direction::Up);
    assert!(state.monsters.keys().any(|key| key.room_index == 1));
    assert!(state.room().unwrap().is_discovered(state.player_position));
}

#[test]
fn test_boss_door_spawns_single_elite() {
    let mut level = level_with(crawler(42, 1), Position::new(7, 7));
    level.room.set_tile(Position::new(2, 3), TileType::BossDoor);
    let mut state = start(GameConfig::for_testing(), level, vec![]);
    state.set_random_source(Box::new(GameRng::new(5)));

    state.attempt_move(Direction::Down).unwrap();
    state.attempt_move(Direction::Down).unwrap();

    assert_eq!(state.current_level, 2);
    let room = state.room().unwrap();
    assert_eq!(room.enemies.len(), 1);
    let boss = state.monster(room.enemies[0].monster).unwrap();
    assert_eq!(boss.name, "Molten Giant");
    assert!(boss.is_elite());
}

#[test]
fn test_purchase_requires_more_credits_than_price() {
    let mut state = start(
        GameConfig::for_testing(),
        level_with(crawler(42, 1), Position::new(7, 7)),
        vec![],
    );
    assert!(!state.purchase_item(gloomcrawl::new_item_id()).unwrap());
    assert_eq!(state.log.latest(), Some("There is no merchant here."));

    let shield = Item::new("shield", ItemKind::Defense, 3, PointOfAction::Passive).priced(10);
    let id = shield.id;
    state.merchant = Some(Merchant::new(vec![shield]));

    state.player.credits = 10;
    assert!(!state.execute(Command::Purchase { id }).unwrap());
    assert_eq!(state.log.latest(), Some("Not enough credits to buy a shield"));
    assert_eq!(state.player.credits, 10);

    state.player.credits = 11;
    assert!(state.execute(Command::Purchase { id }).unwrap());
    assert_eq!(state.log.latest(), Some("You bought a shield that defends for 3!"));
    assert_eq!(state.player.credits, 1);
    assert_eq!(state.player.defense, 3);
    assert!(state.merchant.as_ref().unwrap().inventory.is_empty());

    state.player.credits = 50;
    assert!(!state.execute(Command::Purchase { id }).unwrap());
    assert_eq!(state.player.credits, 50);
}

#[test]
fn test_skill_tree_prerequisites() {
    let mut state = start(
        GameConfig::for_testing(),
        level_with(crawler(42, 1), Position::new(7, 7)),
        vec![],
    );
    assert!(!state.choose_skill_node("p1-1").unwrap());
    assert_eq!(state.log.latest(), Some("You have no skill points to spend."));

    state.player.skill_points = 3;
    assert!(!state.choose_skill_node("p1-2").unwrap());
    assert_eq!(state.player.skill_points, 3);

    assert!(state.execute(Command::ChooseSkill { id: "p1-1".to_string() }).unwrap());
    assert_eq!(state.log.latest(), Some("You chose \"+1 Attack\"!"));
    assert!(state.choose_skill_node("p1-2").unwrap());
    assert_eq!(state.player.attack, 4);
    assert!(!state.choose_skill_node("p1-2").unwrap());

    assert!(state.choose_skill_node("p3-1").unwrap());
    assert_eq!(state.player.health, 105);
    assert_eq!(state.player.starting_health, 105);
    assert_eq!(state.player.skill_points, 0);
}

#[test]
fn test_healing_tile_restores_and_clears() {
    let mut level = level_with(crawler(42, 1), Position::new(7, 7));
    level.room.set_tile(Position::new(2, 1), TileType::Healing);
    let mut state = start(GameConfig::for_testing(), level, vec![]);
    state.player.health = 12;

    state.attempt_move(Direction::Up).unwrap();
    assert_eq!(state.player.health, 100);
    assert_eq!(state.log.latest(), Some("You have been fully healed!"));
    assert_eq!(state.room().unwrap().tile(Position::new(2, 1)), Some(TileType::Floor));
}
