//! Basic demonstration of the arena editor core.
//!
//! Run with: RUST_LOG=arena_sim=debug cargo run --example basic_demo

use arena_sim::{ArenaWorld, CellIndex, EditorMode, PointerInput, Position};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("arena_sim=info".parse()?),
        )
        .init();

    println!("=== Arena Editor - Placement Demo ===\n");

    let mut arena = ArenaWorld::new();
    let crate_kind = arena.catalog().find_by_name("Crate").map(|t| t.id).ok_or("no Crate type")?;
    let turret = arena.catalog().find_by_name("Turret").map(|t| t.id).ok_or("no Turret type")?;

    // Paint a row of crates with one brush stroke.
    println!("--- Brush stroke across row 0 ---");
    arena.select_deployable(crate_kind)?;
    arena.select_mode(EditorMode::Create);
    arena.update(PointerInput::press(center(&arena, 0, 0)))?;
    for col in 1..4 {
        arena.update(PointerInput::hold(center(&arena, col, 0)))?;
    }
    arena.update(PointerInput::release(center(&arena, 3, 0)))?;
    print_grid(&arena);

    // Drag a turret from the palette and drop it.
    println!("\n--- Palette drag: turret to (4, 4) ---");
    arena.begin_palette_drag(turret)?;
    arena.update(PointerInput::hold(center(&arena, 2, 2)))?;
    arena.update(PointerInput::hold(center(&arena, 4, 4)))?;
    let report = arena.update(PointerInput::release(center(&arena, 4, 4)))?;
    let turret_entity = report.spawned().next();
    print_grid(&arena);

    // Try to move the turret onto a crate: it goes back where it was.
    if let Some(entity) = turret_entity {
        println!("\n--- Edit: drop turret onto a crate ---");
        arena.select_mode(EditorMode::Edit);
        let grab_at = arena.deployable_state(entity).map(|s| s.position).unwrap_or_default();
        arena.update(PointerInput::press(grab_at))?;
        arena.update(PointerInput::hold(center(&arena, 1, 0)))?;
        let report = arena.update(PointerInput::release(center(&arena, 1, 0)))?;
        for event in &report.events {
            println!("  {event:?}");
        }
        print_grid(&arena);
    }

    // Sweep the eraser over the crates.
    println!("\n--- Erase sweep over row 0 ---");
    arena.select_mode(EditorMode::Erase);
    let mut erased = 0;
    erased += arena.update(PointerInput::press(center(&arena, 0, 0)))?.erased().count();
    for col in 1..8 {
        erased += arena.update(PointerInput::hold(center(&arena, col, 0)))?.erased().count();
    }
    arena.update(PointerInput::release(center(&arena, 7, 0)))?;
    println!("  erased {erased} deployables");
    print_grid(&arena);

    // A few play ticks.
    arena.select_mode(EditorMode::Play);
    for _ in 0..5 {
        arena.update(PointerInput::idle(Position::default()))?;
    }

    arena.verify_invariants()?;

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", arena.snapshot().to_json_pretty()?);
    Ok(())
}

fn center(arena: &ArenaWorld, col: i32, row: i32) -> Position {
    arena.grid().cell_center(CellIndex::new(col, row))
}

fn print_grid(arena: &ArenaWorld) {
    let grid = arena.grid();
    for row in 0..grid.rows() as i32 {
        let line: String = (0..grid.columns() as i32)
            .map(|col| match grid.cell_at(col, row) {
                Some(cell) if !cell.is_empty() => '#',
                _ => '.',
            })
            .collect();
        println!("  {line}");
    }
}
