use crate::error::IngestError;
use crate::models::{GameweekID, ManagerID};

/// Gameweeks in a Premier League season.
pub const MAX_GAMEWEEK: GameweekID = 38;

pub const MAX_CONCURRENCY: usize = 64;

pub fn validate_gameweek(gameweek: GameweekID) -> Result<GameweekID, IngestError> {
    if !(1..=MAX_GAMEWEEK).contains(&gameweek) {
        return Err(IngestError::InvalidInput(format!(
            "gameweek must be between 1 and {}, got {}",
            MAX_GAMEWEEK, gameweek
        )));
    }
    Ok(gameweek)
}

pub fn validate_manager_id(manager_id: ManagerID) -> Result<ManagerID, IngestError> {
    if manager_id <= 0 {
        return Err(IngestError::InvalidInput(format!(
            "manager id must be positive, got {}",
            manager_id
        )));
    }
    Ok(manager_id)
}

pub fn validate_concurrency(concurrency: usize) -> Result<usize, IngestError> {
    if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
        return Err(IngestError::InvalidInput(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, concurrency
        )));
    }
    Ok(concurrency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gameweek_bounds() {
        assert_eq!(validate_gameweek(1).unwrap(), 1);
        assert_eq!(validate_gameweek(38).unwrap(), 38);
        assert!(validate_gameweek(0).is_err());
        assert!(validate_gameweek(39).is_err());
    }

    #[test]
    fn manager_id_positive() {
        assert!(validate_manager_id(1).is_ok());
        assert!(validate_manager_id(0).is_err());
        assert!(validate_manager_id(-5).is_err());
    }

    #[test]
    fn concurrency_bounds() {
        assert!(validate_concurrency(1).is_ok());
        assert!(validate_concurrency(64).is_ok());
        assert!(validate_concurrency(0).is_err());
        assert!(validate_concurrency(65).is_err());
    }

    #[test]
    fn error_message_is_readable() {
        let err = validate_gameweek(40).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: gameweek must be between 1 and 38, got 40"
        );
    }
}
