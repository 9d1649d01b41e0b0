//! Prompt construction for natural-language report requests.

use crate::domain::SchemaSnapshot;

fn worked_examples(row_limit: u32) -> String {
    format!(
        "Example 1: inventory items with area, system and country from the last 30 days\n\
         SELECT i.id, i.codigo, i.descripcion, a.nombre AS area, s.sistema AS sistema, p.nombre AS pais, i.created_at\n\
         FROM inventarios i\n\
         LEFT JOIN areas a ON a.id = i.area_funcional_id\n\
         LEFT JOIN sistemas s ON s.id = i.sistema_id\n\
         LEFT JOIN paises p ON p.id = i.pais_id\n\
         WHERE i.created_at >= NOW() - INTERVAL '30 days'\n\
         ORDER BY i.created_at DESC\n\
         LIMIT {row_limit}\n\
         \n\
         Example 2: number of inventory items per area\n\
         SELECT a.nombre AS area, COUNT(*) AS total\n\
         FROM inventarios i\n\
         LEFT JOIN areas a ON a.id = i.area_funcional_id\n\
         GROUP BY a.nombre\n\
         ORDER BY total DESC\n\
         LIMIT {row_limit}"
    )
}

/// Build the completion prompt for `request`, grounded on `snapshot`.
///
/// `row_limit` is the cap the model is told to apply; the guard appends the
/// same value when the model omits it. The request is embedded verbatim
/// between double quotes; its content is untrusted, which is why the
/// returned SQL is validated independently.
#[must_use]
pub fn build_report_prompt(
    snapshot: &SchemaSnapshot,
    request: &str,
    row_limit: u32,
) -> String {
    let listing = snapshot.render_listing();
    let examples = worked_examples(row_limit);
    format!(
        "You generate SQL for PostgreSQL.\n\
         Strict rules:\n\
         - Return exactly ONE valid SELECT statement, with no trailing semicolon.\n\
         - Do not include comments in the output.\n\
         - DDL/DML is forbidden (INSERT/UPDATE/DELETE/ALTER/DROP/TRUNCATE/CREATE).\n\
         - Use only the EXACT table and column names from the schema below.\n\
         - If there is no LIMIT, add LIMIT {row_limit}.\n\
         - For date filters, use created_at when applicable.\n\
         \n\
         Schema:\n\
         {listing}\n\
         \n\
         {examples}\n\
         \n\
         Request:\n\
         \"{request}\"\n\
         \n\
         SQL:"
    )
}
