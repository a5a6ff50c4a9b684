//! Room template catalog
//!
//! Static, read-only table of authored room layouts. Each template is a
//! `chunk_size x chunk_size` base grid plus obstacle and entity overlays.
//! The catalog is built once per level and never mutated afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Walkable floor
pub const TILE_FLOOR: u16 = 0;
/// Room wall
pub const TILE_WALL: u16 = 1;
/// Stone pillar obstacle
pub const TILE_PILLAR: u16 = 2;
/// Crate obstacle
pub const TILE_CRATE: u16 = 3;
/// Carpet under merchants and treasure
pub const TILE_CARPET: u16 = 4;

/// Room-type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Start,
    End,
    Combat,
    Treasure,
    Shop,
    Empty,
    CorridorHorizontal,
    CorridorVertical,
    CornerTopLeft,
    CornerTopRight,
    CornerBottomLeft,
    CornerBottomRight,
}

impl RoomType {
    pub const ALL: [RoomType; 12] = [
        RoomType::Start,
        RoomType::End,
        RoomType::Combat,
        RoomType::Treasure,
        RoomType::Shop,
        RoomType::Empty,
        RoomType::CorridorHorizontal,
        RoomType::CorridorVertical,
        RoomType::CornerTopLeft,
        RoomType::CornerTopRight,
        RoomType::CornerBottomLeft,
        RoomType::CornerBottomRight,
    ];

    /// Room kinds the default dungeon layout draws interior cells from
    pub const INTERIOR: [RoomType; 4] = [
        RoomType::Combat,
        RoomType::Treasure,
        RoomType::Shop,
        RoomType::Empty,
    ];
}

/// Entity-type tag for authored spawn placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityTag {
    PlayerStart,
    Exit,
    Chest,
    Merchant,
    Torch,
}

/// Obstacle tile written over the base grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstaclePlacement {
    pub x: usize,
    pub y: usize,
    pub tile: u16,
}

/// Authored entity spawn inside a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPlacement {
    pub x: usize,
    pub y: usize,
    pub tag: EntityTag,
}

/// One authored room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTemplate {
    /// Base layer, indexed `[y][x]`
    pub grid: Vec<Vec<u16>>,
    pub obstacles: Vec<ObstaclePlacement>,
    pub entities: Vec<EntityPlacement>,
}

impl RoomTemplate {
    /// All-walkable room with no overlays
    pub fn open(chunk_size: usize) -> Self {
        Self {
            grid: vec![vec![TILE_FLOOR; chunk_size]; chunk_size],
            obstacles: Vec::new(),
            entities: Vec::new(),
        }
    }

    fn with_obstacle(mut self, x: usize, y: usize, tile: u16) -> Self {
        self.obstacles.push(ObstaclePlacement { x, y, tile });
        self
    }

    fn with_entity(mut self, x: usize, y: usize, tag: EntityTag) -> Self {
        self.entities.push(EntityPlacement { x, y, tag });
        self
    }
}

/// Which sides of a walled room have a doorway
#[derive(Debug, Clone, Copy)]
struct Doors {
    north: bool,
    south: bool,
    east: bool,
    west: bool,
}

impl Doors {
    const ALL: Doors = Doors {
        north: true,
        south: true,
        east: true,
        west: true,
    };
}

/// Bordered room with centered doorways
fn walled_room(n: usize, doors: Doors) -> RoomTemplate {
    let mut room = RoomTemplate::open(n);
    if n < 3 {
        return room;
    }

    let door_width = (n / 4).max(1);
    let door_start = (n - door_width) / 2;
    let in_door = |i: usize| i >= door_start && i < door_start + door_width;

    for i in 0..n {
        if !(doors.north && in_door(i)) {
            room.grid[0][i] = TILE_WALL;
        }
        if !(doors.south && in_door(i)) {
            room.grid[n - 1][i] = TILE_WALL;
        }
        if !(doors.west && in_door(i)) {
            room.grid[i][0] = TILE_WALL;
        }
        if !(doors.east && in_door(i)) {
            room.grid[i][n - 1] = TILE_WALL;
        }
    }
    room
}

/// Walls along two opposite edges only
fn corridor(n: usize, horizontal: bool) -> RoomTemplate {
    let mut room = RoomTemplate::open(n);
    if n < 3 {
        return room;
    }
    for i in 0..n {
        if horizontal {
            room.grid[0][i] = TILE_WALL;
            room.grid[n - 1][i] = TILE_WALL;
        } else {
            room.grid[i][0] = TILE_WALL;
            room.grid[i][n - 1] = TILE_WALL;
        }
    }
    room
}

fn build_template(room: RoomType, n: usize) -> RoomTemplate {
    let mid = n / 2;
    let near = n / 4;
    let far = n - 1 - n / 4;

    match room {
        RoomType::Start => walled_room(n, Doors::ALL).with_entity(mid, mid, EntityTag::PlayerStart),
        RoomType::End => walled_room(n, Doors::ALL).with_entity(mid, mid, EntityTag::Exit),
        RoomType::Combat => walled_room(n, Doors::ALL)
            .with_obstacle(near, near, TILE_PILLAR)
            .with_obstacle(far, near, TILE_PILLAR)
            .with_obstacle(near, far, TILE_PILLAR)
            .with_obstacle(far, far, TILE_PILLAR),
        RoomType::Treasure => {
            let mut room = walled_room(n, Doors::ALL)
                .with_obstacle(mid.saturating_sub(1), mid.saturating_sub(1), TILE_CRATE)
                .with_obstacle((mid + 1).min(n - 1), mid.saturating_sub(1), TILE_CRATE)
                .with_entity(mid, mid, EntityTag::Chest);
            room.grid[mid][mid] = TILE_CARPET;
            room
        }
        RoomType::Shop => {
            let mut room = walled_room(n, Doors::ALL)
                .with_entity(mid, mid, EntityTag::Merchant)
                .with_entity(near, near, EntityTag::Torch)
                .with_entity(far, near, EntityTag::Torch);
            room.grid[mid][mid] = TILE_CARPET;
            room
        }
        RoomType::Empty => RoomTemplate::open(n),
        RoomType::CorridorHorizontal => corridor(n, true),
        RoomType::CorridorVertical => corridor(n, false),
        // Corners sit at the world corners; doors face inward
        RoomType::CornerTopLeft => walled_room(
            n,
            Doors {
                north: false,
                south: true,
                east: true,
                west: false,
            },
        ),
        RoomType::CornerTopRight => walled_room(
            n,
            Doors {
                north: false,
                south: true,
                east: false,
                west: true,
            },
        ),
        RoomType::CornerBottomLeft => walled_room(
            n,
            Doors {
                north: true,
                south: false,
                east: true,
                west: false,
            },
        ),
        RoomType::CornerBottomRight => walled_room(
            n,
            Doors {
                north: true,
                south: false,
                east: false,
                west: true,
            },
        ),
    }
}

/// Read-only lookup table from room type to template
#[derive(Debug, Clone)]
pub struct RoomCatalog {
    chunk_size: usize,
    templates: HashMap<RoomType, RoomTemplate>,
    fallback: RoomTemplate,
}

impl RoomCatalog {
    /// The built-in catalog with an entry for every room type
    pub fn standard(chunk_size: usize) -> Self {
        let mut catalog = Self::empty(chunk_size);
        for room in RoomType::ALL {
            catalog.templates.insert(room, build_template(room, chunk_size));
        }
        catalog
    }

    /// Catalog with no entries; every lookup resolves to the open fallback
    pub fn empty(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            templates: HashMap::new(),
            fallback: RoomTemplate::open(chunk_size),
        }
    }

    /// Replace or add one entry (catalog assembly only)
    pub fn with_template(mut self, room: RoomType, template: RoomTemplate) -> Self {
        self.templates.insert(room, template);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Template for `room`, or the all-walkable fallback if none is registered
    pub fn lookup(&self, room: RoomType) -> &RoomTemplate {
        match self.templates.get(&room) {
            Some(template) => template,
            None => {
                log::warn!("No template registered for {:?}, using empty room", room);
                &self.fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_total() {
        let catalog = RoomCatalog::standard(16);
        for room in RoomType::ALL {
            let template = catalog.lookup(room);
            assert_eq!(template.grid.len(), 16);
            assert!(template.grid.iter().all(|row| row.len() == 16));
        }
    }

    #[test]
    fn test_placements_in_bounds_for_any_size() {
        for n in [1, 2, 3, 4, 7, 16, 32] {
            let catalog = RoomCatalog::standard(n);
            for room in RoomType::ALL {
                let template = catalog.lookup(room);
                assert!(template.obstacles.iter().all(|o| o.x < n && o.y < n), "{room:?} n={n}");
                assert!(template.entities.iter().all(|e| e.x < n && e.y < n), "{room:?} n={n}");
            }
        }
    }

    #[test]
    fn test_missing_entry_falls_back_to_open_room() {
        let catalog = RoomCatalog::empty(8);
        let template = catalog.lookup(RoomType::Combat);
        assert!(template.grid.iter().flatten().all(|&t| t == TILE_FLOOR));
        assert!(template.obstacles.is_empty());
        assert!(template.entities.is_empty());
    }

    #[test]
    fn test_walled_room_has_doorways() {
        let catalog = RoomCatalog::standard(16);
        let start = catalog.lookup(RoomType::Start);
        // Corners are walls, the middle of each edge is open
        assert_eq!(start.grid[0][0], TILE_WALL);
        assert_eq!(start.grid[0][8], TILE_FLOOR);
        assert_eq!(start.grid[8][0], TILE_FLOOR);
        assert_eq!(start.grid[15][8], TILE_FLOOR);
        assert_eq!(start.grid[8][15], TILE_FLOOR);
        assert!(start.entities.iter().any(|e| e.tag == EntityTag::PlayerStart));
    }

    #[test]
    fn test_corner_doors_face_inward() {
        let catalog = RoomCatalog::standard(16);
        let corner = catalog.lookup(RoomType::CornerTopLeft);
        assert_eq!(corner.grid[0][8], TILE_WALL); // north closed
        assert_eq!(corner.grid[8][0], TILE_WALL); // west closed
        assert_eq!(corner.grid[15][8], TILE_FLOOR); // south open
        assert_eq!(corner.grid[8][15], TILE_FLOOR); // east open
    }

    #[test]
    fn test_corridors() {
        let catalog = RoomCatalog::standard(16);
        let h = catalog.lookup(RoomType::CorridorHorizontal);
        assert!(h.grid[0].iter().all(|&t| t == TILE_WALL));
        assert_eq!(h.grid[8][0], TILE_FLOOR);
        let v = catalog.lookup(RoomType::CorridorVertical);
        assert!(v.grid.iter().all(|row| row[0] == TILE_WALL));
        assert_eq!(v.grid[0][8], TILE_FLOOR);
    }
}
