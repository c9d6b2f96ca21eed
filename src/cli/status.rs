use crate::correction::IndexKind;
use crate::error::Result;
use crate::settings::load_settings;
use crate::storage::{get_connection, get_session};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("verba.db");

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Índice:     {}", settings.correction_index);
    println!("Juros:      {}", settings.interest_mode);

    println!();
    for index in [IndexKind::Selic, IndexKind::IpcaE, IndexKind::Inpc] {
        println!(
            "Tabela {}: {} meses (fallback {:.1}%)",
            index.as_str(),
            index.table_len(),
            index.fallback_rate()
        );
    }

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let users: i64 = conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?;
        println!();
        println!("Usuários:   {users}");
        match get_session(&conn)? {
            Some(user) => println!("Sessão:     {} <{}>", user.name, user.email),
            None => println!("Sessão:     (nenhuma)"),
        }
    } else {
        println!();
        println!("Database not found. Run `verba init` to set up.");
    }

    Ok(())
}
