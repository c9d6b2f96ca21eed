use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{Result, VerbaError};
use crate::settings::get_data_dir;
use crate::storage::{self, get_connection};

fn conn() -> Result<rusqlite::Connection> {
    let db_path = get_data_dir().join("verba.db");
    if !db_path.exists() {
        return Err(VerbaError::Other(
            "Banco de dados não encontrado. Execute `verba init`.".to_string(),
        ));
    }
    get_connection(&db_path)
}

pub fn add(name: &str, email: &str, role: &str) -> Result<()> {
    if role != "admin" && role != "user" {
        return Err(VerbaError::Other(format!("Papel inválido: {role}")));
    }
    let conn = conn()?;
    let password = rpassword::prompt_password("Senha: ")
        .map_err(|e| VerbaError::Other(e.to_string()))?;
    if password.trim().is_empty() {
        return Err(VerbaError::Other("A senha não pode ser vazia".to_string()));
    }
    storage::save_user(&conn, name, email, &password, role)?;
    println!("Usuário salvo: {name} <{email}>");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = conn()?;
    let users = storage::list_users(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Nome", "E-mail", "Papel", "Criado em"]);
    for user in users {
        table.add_row(vec![
            Cell::new(user.id),
            Cell::new(user.name),
            Cell::new(user.email),
            Cell::new(user.role),
            Cell::new(user.created_at),
        ]);
    }
    println!("Usuários\n{table}");
    Ok(())
}

pub fn delete(email: &str) -> Result<()> {
    let conn = conn()?;
    storage::delete_user(&conn, email)?;
    println!("Usuário removido: {email}");
    Ok(())
}

pub fn login(email: &str) -> Result<()> {
    let conn = conn()?;
    let password = rpassword::prompt_password("Senha: ")
        .map_err(|e| VerbaError::Other(e.to_string()))?;
    let user = storage::authenticate(&conn, email, &password)?;
    storage::set_session(&conn, user.id)?;
    println!("{}", format!("Sessão aberta para {}", user.name).green());
    Ok(())
}

pub fn logout() -> Result<()> {
    let conn = conn()?;
    storage::clear_session(&conn)?;
    println!("Sessão encerrada.");
    Ok(())
}
