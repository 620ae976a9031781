// src/schema/graph.rs

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};

use super::TableSpec;

/// Total load order over the catalog: every table appears strictly after
/// all tables it foreign-keys into.
///
/// The target schema is a rooted hierarchy, so this never has real work to
/// do, but a cycle introduced by a future catalog edit must fail fast here
/// as a configuration error rather than load tables in a silently wrong
/// order. Ties resolve to catalog order so the run sequence is stable.
pub fn load_order(specs: &[TableSpec]) -> Result<Vec<&TableSpec>> {
    let known: HashSet<&str> = specs.iter().map(|s| s.table).collect();
    let mut remaining: HashMap<&str, HashSet<&str>> = HashMap::new();
    for spec in specs {
        for dep in spec.depends_on {
            if !known.contains(dep) {
                bail!("table {}: unknown dependency {}", spec.table, dep);
            }
        }
        remaining.insert(spec.table, spec.depends_on.iter().copied().collect());
    }

    let mut order = Vec::with_capacity(specs.len());
    let mut done: HashSet<&str> = HashSet::new();

    while order.len() < specs.len() {
        let next = specs.iter().find(|s| {
            !done.contains(s.table) && remaining[s.table].iter().all(|d| done.contains(d))
        });
        match next {
            Some(spec) => {
                done.insert(spec.table);
                order.push(spec);
            }
            None => {
                let mut stuck: Vec<&str> = remaining
                    .keys()
                    .filter(|t| !done.contains(*t))
                    .copied()
                    .collect();
                stuck.sort_unstable();
                bail!("dependency cycle among tables: {}", stuck.join(", "));
            }
        }
    }

    Ok(order)
}

/// Ordering guard: a table may only load once every table it references has
/// completed. Violations are configuration/ordering errors, never silently
/// tolerated.
pub fn assert_loadable(spec: &TableSpec, completed: &HashSet<&str>) -> Result<()> {
    for dep in spec.depends_on {
        if !completed.contains(dep) {
            bail!(
                "table {} requires {} to be loaded first",
                spec.table,
                dep
            );
        }
    }
    Ok(())
}
