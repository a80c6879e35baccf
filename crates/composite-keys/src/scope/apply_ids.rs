//! Key restriction for any entity, composite or not

use crate::config::KeyConfig;
use crate::error::KeyResult;
use crate::query::QueryBuilder;

use super::composite::{CompositeKeyScope, KeySelector};

/// Restrict a query to (or away from) the selected keys.
///
/// Composite keys go through `CompositeKeyScope`. Single-column keys take the
/// `IN` / `NOT IN` fast path, with binary columns still converted from hex.
pub fn apply_ids<M>(
    config: &KeyConfig,
    query: QueryBuilder<M>,
    selector: KeySelector<'_>,
) -> KeyResult<QueryBuilder<M>> {
    config.validate()?;

    if config.is_composite() {
        return CompositeKeyScope::new(config, selector).apply(query);
    }

    let column = config.first_key_column()?;
    let codec = config.codec();
    let inverse = selector.inverse;

    let mut values = Vec::with_capacity(selector.keys.len());
    for input in selector.keys {
        for tuple in input.into_tuples(config)? {
            let value = tuple.require(column)?.clone();
            values.push(codec.to_storage(column, value));
        }
    }

    let qualified = config.qualify_column(column);
    Ok(if inverse {
        query.where_not_in(&qualified, values)
    } else {
        query.where_in(&qualified, values)
    })
}
