use sqlx::MySqlPool;

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        email VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE KEY uniq_users_email (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        user_id BIGINT UNSIGNED NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        age TINYINT UNSIGNED NOT NULL,
        rate BIGINT NOT NULL,
        fullday_rate BIGINT NULL,
        email VARCHAR(255) NOT NULL,
        is_admin BOOLEAN NOT NULL DEFAULT FALSE,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS check_ins (
        id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        user_id BIGINT UNSIGNED NOT NULL,
        check_date DATE NOT NULL,
        shift VARCHAR(16) NOT NULL,
        UNIQUE KEY uniq_check_ins_user_date (user_id, check_date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS withdrawals (
        id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        user_id BIGINT UNSIGNED NOT NULL,
        amount BIGINT NOT NULL,
        withdrawal_date TIMESTAMP(6) NOT NULL,
        KEY idx_withdrawals_user (user_id)
    )
    "#,
];

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

/// Creates the tables on first start. The unique key on `check_ins` is what
/// rejects a second check-in for the same day.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
