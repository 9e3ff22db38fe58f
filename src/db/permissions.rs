use sqlx::PgPool;

/// Capability check: does the actor's role carry this permission?
pub async fn user_has(pool: &PgPool, user_id: i64, capability: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT 1 FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1 AND p.name = $2
        )",
    )
    .bind(user_id)
    .bind(capability)
    .fetch_one(pool)
    .await
}

/// Grants the named capabilities to a role. Unknown capability names are
/// ignored (the catalog is seeded by migration).
pub async fn grant(pool: &PgPool, role_id: i64, capabilities: &[&str]) -> Result<(), sqlx::Error> {
    let names: Vec<String> = capabilities.iter().map(|c| c.to_string()).collect();
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
         SELECT $1, p.id FROM permissions p WHERE p.name = ANY($2)
         ON CONFLICT DO NOTHING",
    )
    .bind(role_id)
    .bind(names)
    .execute(pool)
    .await?;
    Ok(())
}
