//! Database schema and operations

use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::models::{Belt, Definitions, Drill, Furnace, Part, Recipe, Smeltable};
use crate::registry::RecipeRegistry;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Ores and other smeltable materials
        CREATE TABLE IF NOT EXISTS smeltables (
            name TEXT PRIMARY KEY,
            smelting_speed REAL NOT NULL,
            mining_time REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS furnaces (
            name TEXT PRIMARY KEY,
            base_smelting_speed REAL NOT NULL,
            beacon_modifier REAL NOT NULL DEFAULT 0,
            fuel_consumption REAL NOT NULL DEFAULT 0,
            energy_consumption REAL NOT NULL DEFAULT 0,
            pollution_production REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS belts (
            name TEXT PRIMARY KEY,
            speed REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS drills (
            name TEXT PRIMARY KEY,
            mining_speed REAL NOT NULL,
            pollution REAL NOT NULL DEFAULT 0
        );

        -- One row per item; raw items have no parts
        CREATE TABLE IF NOT EXISTS recipes (
            name TEXT PRIMARY KEY,
            output_amount REAL NOT NULL,
            crafting_time REAL NOT NULL
        );

        -- Ingredients per batch, in recipe order
        CREATE TABLE IF NOT EXISTS recipe_parts (
            recipe_name TEXT NOT NULL,
            position INTEGER NOT NULL,
            part_name TEXT NOT NULL,
            amount REAL NOT NULL,
            PRIMARY KEY (recipe_name, position)
        );

        CREATE INDEX IF NOT EXISTS idx_recipe_parts_part ON recipe_parts(part_name);
        "#,
    )?;
    Ok(())
}

/// Remove every stored definition
pub fn clear_definitions(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM recipe_parts;
        DELETE FROM recipes;
        DELETE FROM drills;
        DELETE FROM belts;
        DELETE FROM furnaces;
        DELETE FROM smeltables;
        "#,
    )?;
    Ok(())
}

pub fn upsert_smeltable(conn: &Connection, name: &str, smeltable: &Smeltable) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO smeltables (name, smelting_speed, mining_time) VALUES (?1, ?2, ?3)",
        params![name, smeltable.smelting_speed, smeltable.mining_time],
    )?;
    Ok(())
}

pub fn upsert_furnace(conn: &Connection, name: &str, furnace: &Furnace) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO furnaces
            (name, base_smelting_speed, beacon_modifier, fuel_consumption, energy_consumption, pollution_production)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            name,
            furnace.base_smelting_speed,
            furnace.beacon_modifier,
            furnace.fuel_consumption,
            furnace.energy_consumption,
            furnace.pollution_production,
        ],
    )?;
    Ok(())
}

pub fn upsert_belt(conn: &Connection, name: &str, belt: &Belt) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO belts (name, speed) VALUES (?1, ?2)",
        params![name, belt.speed],
    )?;
    Ok(())
}

pub fn upsert_drill(conn: &Connection, name: &str, drill: &Drill) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO drills (name, mining_speed, pollution) VALUES (?1, ?2, ?3)",
        params![name, drill.mining_speed, drill.pollution],
    )?;
    Ok(())
}

/// Insert or replace a recipe together with its parts
pub fn upsert_recipe(conn: &Connection, name: &str, recipe: &Recipe) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO recipes (name, output_amount, crafting_time) VALUES (?1, ?2, ?3)",
        params![name, recipe.output_amount, recipe.crafting_time],
    )?;
    conn.execute("DELETE FROM recipe_parts WHERE recipe_name = ?1", [name])?;

    let mut stmt = conn.prepare(
        "INSERT INTO recipe_parts (recipe_name, position, part_name, amount) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, part) in recipe.parts.iter().enumerate() {
        stmt.execute(params![name, position as i64, part.name, part.amount])?;
    }
    Ok(())
}

/// Store every definition in one transaction, first removing the existing
/// ones when `replace` is set. Nothing changes if any write fails.
pub fn store_definitions(conn: &mut Connection, defs: &Definitions, replace: bool) -> Result<()> {
    let tx = conn.transaction()?;
    if replace {
        clear_definitions(&tx)?;
    }
    for (name, smeltable) in &defs.smeltables {
        upsert_smeltable(&tx, name, smeltable)?;
    }
    for (name, furnace) in &defs.furnaces {
        upsert_furnace(&tx, name, furnace)?;
    }
    for (name, belt) in &defs.belts {
        upsert_belt(&tx, name, belt)?;
    }
    for (name, drill) in &defs.drills {
        upsert_drill(&tx, name, drill)?;
    }
    for (name, recipe) in &defs.recipes {
        upsert_recipe(&tx, name, recipe)?;
    }
    tx.commit()?;
    debug!(entries = defs.len(), "stored definitions");
    Ok(())
}

fn load_map<T>(
    conn: &Connection,
    sql: &str,
    map_row: impl Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> Result<HashMap<String, T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, map_row(row)?)))?;

    let mut results = HashMap::new();
    for row in rows {
        let (name, value) = row?;
        results.insert(name, value);
    }
    Ok(results)
}

pub fn load_smeltables(conn: &Connection) -> Result<HashMap<String, Smeltable>> {
    load_map(
        conn,
        "SELECT name, smelting_speed, mining_time FROM smeltables",
        |row| {
            Ok(Smeltable {
                smelting_speed: row.get(1)?,
                mining_time: row.get(2)?,
            })
        },
    )
}

pub fn load_furnaces(conn: &Connection) -> Result<HashMap<String, Furnace>> {
    load_map(
        conn,
        "SELECT name, base_smelting_speed, beacon_modifier, fuel_consumption, energy_consumption, pollution_production
         FROM furnaces",
        |row| {
            Ok(Furnace {
                base_smelting_speed: row.get(1)?,
                beacon_modifier: row.get(2)?,
                fuel_consumption: row.get(3)?,
                energy_consumption: row.get(4)?,
                pollution_production: row.get(5)?,
            })
        },
    )
}

pub fn load_belts(conn: &Connection) -> Result<HashMap<String, Belt>> {
    load_map(conn, "SELECT name, speed FROM belts", |row| {
        Ok(Belt { speed: row.get(1)? })
    })
}

pub fn load_drills(conn: &Connection) -> Result<HashMap<String, Drill>> {
    load_map(conn, "SELECT name, mining_speed, pollution FROM drills", |row| {
        Ok(Drill {
            mining_speed: row.get(1)?,
            pollution: row.get(2)?,
        })
    })
}

pub fn load_recipes(conn: &Connection) -> Result<HashMap<String, Recipe>> {
    let mut recipes = load_map(
        conn,
        "SELECT name, output_amount, crafting_time FROM recipes",
        |row| Ok(Recipe::new(row.get(1)?, row.get(2)?)),
    )?;

    let mut stmt = conn.prepare(
        "SELECT recipe_name, part_name, amount FROM recipe_parts ORDER BY recipe_name, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Part {
                name: row.get(1)?,
                amount: row.get(2)?,
            },
        ))
    })?;
    for row in rows {
        let (recipe_name, part) = row?;
        if let Some(recipe) = recipes.get_mut(&recipe_name) {
            recipe.parts.push(part);
        }
    }
    Ok(recipes)
}

pub fn load_definitions(conn: &Connection) -> Result<Definitions> {
    let defs = Definitions {
        smeltables: load_smeltables(conn)?,
        furnaces: load_furnaces(conn)?,
        belts: load_belts(conn)?,
        drills: load_drills(conn)?,
        recipes: load_recipes(conn)?,
    };
    debug!(entries = defs.len(), "loaded definitions");
    Ok(defs)
}

/// Build the recipe registry from stored recipes
pub fn load_registry(conn: &Connection) -> Result<RecipeRegistry> {
    let recipes = load_recipes(conn)?;
    RecipeRegistry::new(recipes).context("stored recipes are invalid")
}

/// List all recipe names with their ingredient count
pub fn list_recipes(conn: &Connection) -> Result<Vec<(String, usize)>> {
    let mut stmt = conn.prepare(
        "SELECT r.name, COUNT(p.part_name)
         FROM recipes r
         LEFT JOIN recipe_parts p ON p.recipe_name = r.name
         GROUP BY r.name
         ORDER BY r.name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn definitions_survive_a_round_trip() {
        let mut conn = memory_db();
        let defs = sample::definitions();
        store_definitions(&mut conn, &defs, false).unwrap();
        assert_eq!(load_definitions(&conn).unwrap(), defs);
    }

    #[test]
    fn recipe_parts_keep_their_order() {
        let conn = memory_db();
        let recipe = Recipe::new(1.0, 0.5)
            .with_part("zinc", 1.0)
            .with_part("aluminium", 2.0)
            .with_part("manganese", 3.0);
        upsert_recipe(&conn, "alloy", &recipe).unwrap();
        assert_eq!(load_recipes(&conn).unwrap()["alloy"], recipe);
    }

    #[test]
    fn upsert_replaces_previous_parts() {
        let conn = memory_db();
        upsert_recipe(&conn, "gear", &Recipe::new(1.0, 0.5).with_part("plate", 2.0)).unwrap();
        upsert_recipe(&conn, "gear", &Recipe::new(1.0, 0.5).with_part("steel", 1.0)).unwrap();
        let recipes = load_recipes(&conn).unwrap();
        assert_eq!(recipes["gear"].parts, vec![Part::new("steel", 1.0)]);
    }

    #[test]
    fn list_recipes_counts_parts() {
        let mut conn = memory_db();
        store_definitions(&mut conn, &sample::definitions(), false).unwrap();
        let listed = list_recipes(&conn).unwrap();
        assert!(listed.contains(&("iron-ore".to_string(), 0)));
        assert!(listed.contains(&("inserter".to_string(), 3)));
    }

    #[test]
    fn replacing_store_drops_old_entries() {
        let mut conn = memory_db();
        store_definitions(&mut conn, &sample::definitions(), false).unwrap();

        let mut smaller = Definitions::default();
        smaller.belts.insert("yellow".to_string(), Belt { speed: 15.0 });
        store_definitions(&mut conn, &smaller, true).unwrap();

        assert_eq!(load_definitions(&conn).unwrap(), smaller);
    }

    #[test]
    fn clear_removes_everything() {
        let mut conn = memory_db();
        store_definitions(&mut conn, &sample::definitions(), false).unwrap();
        clear_definitions(&conn).unwrap();
        assert!(load_definitions(&conn).unwrap().is_empty());
    }
}
