//! End-to-end scenarios: generation, combat, chained teleports and inventory
//! handling through the public engine API.

use delve::generation::utils::rng_from_seed;
use delve::{
    AttackMode, ContentAllocator, ContentEntity, DelveError, Direction, Event, EventEffect, Explorer,
    ExplorerConfig, ExplorerEngine, GenerationConfig, Generator, Item, Map, Monster, Position, Room,
};

fn line_map(rooms: i32) -> Map {
    let mut map = Map::new(rooms as u32, 1, Position::new(0, 0));
    for x in 1..rooms {
        map.insert_room(Room::new(x as u32, Position::new(x, 0)))
            .unwrap();
        map.connect(Position::new(x - 1, 0), Direction::East).unwrap();
    }
    map
}

fn portal(auto_explore: bool) -> ContentEntity {
    ContentEntity::Event(Event {
        name: "Portal".to_string(),
        description: "A shimmering doorway".to_string(),
        effect: EventEffect::Teleport { auto_explore },
    })
}

#[test]
fn test_reference_dungeon_is_connected() {
    let map = delve::generate(8, 6, 12, 42).unwrap();
    assert_eq!(map.room_count(), 12);
    assert!(map.is_fully_reachable());
    assert!(map.connections_are_symmetric());

    let again = delve::generate(8, 6, 12, 42).unwrap();
    assert_eq!(again, map);
}

#[test]
fn test_oversized_request_is_rejected() {
    match delve::generate(4, 4, 17, 1) {
        Err(DelveError::InvalidSize {
            requested,
            capacity,
        }) => {
            assert_eq!(requested, 17);
            assert_eq!(capacity, 16);
        }
        other => panic!("expected InvalidSize, got {:?}", other),
    }
}

#[test]
fn test_monster_fight_always_terminates() {
    for seed in 0..100 {
        let mut map = line_map(2);
        map.room_mut(Position::new(1, 0)).unwrap().content =
            Some(ContentEntity::Monster(Monster::new("Goblin", 5, 2)));

        let config = ExplorerConfig {
            hp: 20,
            base_attack: 3,
        };
        let mut engine = ExplorerEngine::new(map, config, rng_from_seed(seed));
        engine.move_in(Direction::East).unwrap();
        engine.explore_room();

        let monster_left = engine.current_room().unwrap().content.clone();
        match monster_left {
            None => assert!(engine.explorer().hp > 0),
            Some(ContentEntity::Monster(m)) => {
                assert_eq!(engine.explorer().hp, 0);
                assert!(m.hp > 0);
            }
            Some(other) => panic!("unexpected content {:?}", other),
        }
    }
}

#[test]
fn test_nested_teleports_stop_at_chain_limit() {
    let mut map = line_map(4);
    for room in map.rooms_mut() {
        room.content = Some(portal(true));
    }

    let mut engine = ExplorerEngine::new(map, ExplorerConfig::default(), rng_from_seed(5));
    let narrative = engine.explore_room();

    assert_eq!(narrative.matches("A portal pulls you").count(), 4);
    assert_eq!(narrative.matches("Chain limit reached").count(), 1);

    let remaining = engine
        .map()
        .rooms()
        .filter(|r| r.content.is_some())
        .count();
    assert!(remaining < 4);
}

#[test]
fn test_portal_interrupts_a_walk() {
    let mut map = line_map(3);
    map.room_mut(Position::new(1, 0)).unwrap().content = Some(portal(false));
    let mut engine = ExplorerEngine::new(map, ExplorerConfig::default(), rng_from_seed(3));

    let result = engine.move_along(Position::new(2, 0));
    assert!(matches!(result, Err(DelveError::InvalidAction(_))));
    assert_ne!(engine.explorer().position, Position::new(1, 0));
    assert!(engine.map().room(Position::new(1, 0)).unwrap().content.is_none());
}

#[test]
fn test_portal_without_auto_explore_only_moves() {
    let mut map = line_map(3);
    map.room_mut(Position::new(0, 0)).unwrap().content = Some(portal(false));
    map.room_mut(Position::new(2, 0)).unwrap().content =
        Some(ContentEntity::Monster(Monster::new("Slime", 4, 1)));

    let mut engine = ExplorerEngine::new(map, ExplorerConfig::default(), rng_from_seed(1));
    let narrative = engine.explore_room();

    assert!(narrative.starts_with("A portal pulls you"));
    assert!(!narrative.contains("fight"));
    assert_ne!(engine.explorer().position, Position::new(0, 0));
    assert!(engine.map().room(Position::new(2, 0)).unwrap().content.is_some());
}

#[test]
fn test_equipping_a_gem_changes_nothing() {
    let map = line_map(1);
    let mut explorer = Explorer::new(map.spawn(), ExplorerConfig::default());
    explorer.inventory.push(Item::new("Garnet", 12, "Red and warm"));
    explorer
        .equipped
        .insert("weapon".to_string(), Item::equipable("Club", 5, "weapon", 1));
    let before = explorer.clone();

    let mut engine = ExplorerEngine::with_explorer(map, explorer, rng_from_seed(0));
    let result = engine.equip("Garnet");

    assert!(matches!(result, Err(DelveError::NotEquipable(_))));
    assert_eq!(engine.explorer(), &before);
}

#[test]
fn test_treasure_then_equip() {
    let mut map = line_map(2);
    map.room_mut(Position::new(1, 0)).unwrap().content = Some(ContentEntity::Treasure(
        delve::Treasure {
            reward: Item::equipable("Hand axe", 14, "weapon", 2),
        },
    ));
    let mut engine = ExplorerEngine::new(map, ExplorerConfig::default(), rng_from_seed(0));
    let base = engine.explorer().compute_attack();

    let log = engine.move_along(Position::new(1, 0)).unwrap();
    assert_eq!(log.len(), 1);
    assert!(log[0].contains("Hand axe"));

    engine.equip("Hand axe").unwrap();
    assert!(engine.explorer().inventory.is_empty());
    assert_eq!(engine.explorer().compute_attack(), base + 2);
}

#[test]
fn test_shrine_raises_attack_for_good() {
    let mut map = line_map(3);
    map.room_mut(Position::new(1, 0)).unwrap().content =
        Some(ContentEntity::Event(Event {
            name: "Shrine".to_string(),
            description: "+2 attack, for good".to_string(),
            effect: EventEffect::ModifyAttack {
                delta: 2,
                mode: AttackMode::Permanent,
                rooms: 0,
            },
        }));
    let mut engine = ExplorerEngine::new(map, ExplorerConfig::default(), rng_from_seed(0));
    let base = engine.explorer().compute_attack();

    engine.move_along(Position::new(2, 0)).unwrap();
    assert_eq!(engine.explorer().compute_attack(), base + 2);
}

#[test]
fn test_generated_session_walks_to_boss() {
    let config = GenerationConfig::new(42);
    let mut rng = rng_from_seed(config.seed);
    let mut map = delve::GridTopologyBuilder::new()
        .generate(&config, &mut rng)
        .unwrap();
    ContentAllocator::from_config(&config).distribute(&mut map, &mut rng);
    // Portals would pull the explorer off the path.
    for room in map.rooms_mut() {
        if matches!(room.content, Some(ContentEntity::Event(_))) {
            room.content = None;
        }
    }

    let engine_config = ExplorerConfig {
        hp: 500,
        base_attack: 10,
    };
    let mut engine = ExplorerEngine::new(map, engine_config, rng);

    let stats = engine.map().stats();
    assert_eq!(stats.total, 12);
    assert_eq!(stats.bosses, 1);
    assert!(engine.map().spawn_room().unwrap().content.is_none());

    let boss = engine
        .map()
        .rooms()
        .find(|r| matches!(r.content, Some(ContentEntity::Boss(_))))
        .map(|r| r.position)
        .unwrap();
    let steps = engine.find_path(boss).len();
    let log = engine.move_along(boss).unwrap();

    assert_eq!(log.len(), steps);
    assert_eq!(engine.explorer().position, boss);
    assert!(engine.explorer().is_alive());
}

#[test]
fn test_same_seed_same_session() {
    let config = GenerationConfig::new(7);
    let a = ExplorerEngine::from_config(&config, ExplorerConfig::default()).unwrap();
    let b = ExplorerEngine::from_config(&config, ExplorerConfig::default()).unwrap();
    assert_eq!(a.map(), b.map());
}
