// otomata share links: http://earslap.com/projectslab/otomata?q=<pairs>
//
// each pair is <col><row&state>. the second character's position in ROW_STATE
// gives row = pos / 4 and heading = pos % 4. a cell holding several tokens
// appears once per token.

use crate::board::{Board, Cell, Direction};
use crate::error::OtomataUrlError;
use crate::pipeline::settings::BoardSettings;

pub const URL_PREFIX: &str = "http://earslap.com/projectslab/otomata?q=";

const ROW_STATE: &str = "qwertyuiopasdfghjklzxcvbnm0123456789";
const SIZE: usize = 9;

const IMPORT_NOTE_DURATION_MS: u32 = 3000;
const IMPORT_SAMPLE: &str = "hang.wav";

pub fn import_url(url: &str) -> Result<BoardSettings, OtomataUrlError> {
    let query = url
        .split_once('?')
        .and_then(|(_, q)| q.split('&').find_map(|kv| kv.strip_prefix("q=")))
        .ok_or(OtomataUrlError::MissingQuery)?
        .trim();

    let chars: Vec<char> = query.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(OtomataUrlError::OddLength(query.to_string()));
    }

    let mut board = Board::new(SIZE, SIZE);
    for pair in chars.chunks_exact(2) {
        let (col_ch, rs_ch) = (pair[0], pair[1]);
        let col = col_ch
            .to_digit(10)
            .map(|c| c as usize)
            .filter(|&c| c < SIZE)
            .ok_or(OtomataUrlError::InvalidColumn(col_ch))?;
        let pos = ROW_STATE
            .find(rs_ch)
            .ok_or(OtomataUrlError::InvalidRowState(rs_ch))?;
        let dir = Direction::from_index((pos % 4) as u8)
            .ok_or(OtomataUrlError::InvalidRowState(rs_ch))?;
        board[(col, pos / 4)].absorb(dir);
    }

    let mut settings = BoardSettings::with_board(board);
    settings.note_duration_ms = IMPORT_NOTE_DURATION_MS;
    settings.use_samples = true;
    settings.sample = IMPORT_SAMPLE.to_string();
    tracing::debug!(tokens = chars.len() / 2, "imported otomata url");
    Ok(settings)
}

/// Only tokens inside the top-left 9x9 region can be expressed; walls,
/// rotators and anything further out are left behind.
pub fn export_url(settings: &BoardSettings) -> String {
    let board = &settings.board;
    let row_state: Vec<char> = ROW_STATE.chars().collect();
    let mut out = String::from(URL_PREFIX);

    for row in 0..board.rows().min(SIZE) {
        for col in 0..board.cols().min(SIZE) {
            let dirs: &[Direction] = match &board[(col, row)] {
                Cell::Token(d) => std::slice::from_ref(d),
                Cell::Merged(ds) => ds,
                _ => continue,
            };
            for d in dirs {
                out.push(char::from(b'0' + col as u8));
                out.push(row_state[row * 4 + d.index() as usize]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn import_places_tokens_with_otomata_defaults() {
        // 'q' = row 0 up, 'w' = row 0 right, 'a' = index 10 -> row 2 down
        let s = import_url("http://www.earslap.com/projectslab/otomata?q=0q4w8a").unwrap();
        assert_eq!(s.board[(0, 0)], Cell::Token(Direction::Up));
        assert_eq!(s.board[(4, 0)], Cell::Token(Direction::Right));
        assert_eq!(s.board[(8, 2)], Cell::Token(Direction::Down));
        assert_eq!(s.board.live_cells(), 3);
        assert_eq!(s.note_duration_ms, 3000);
        assert_eq!(s.speed_ms, 250);
        assert_eq!(s.sample, "hang.wav");
        assert!(s.use_samples);
    }

    #[test]
    fn repeated_positions_merge_in_order() {
        let s = import_url("http://earslap.com/projectslab/otomata?q=3u3y3u").unwrap();
        // 'u' = 6 -> row 1 down, 'y' = 5 -> row 1 right
        assert_eq!(
            s.board[(3, 1)],
            Cell::Merged(vec![Direction::Down, Direction::Right, Direction::Down])
        );
    }

    #[test]
    fn export_then_import_keeps_tokens() {
        let mut board = Board::new(9, 9);
        board[(1, 8)] = Cell::Token(Direction::Left);
        board[(5, 5)] = Cell::Merged(vec![Direction::Up, Direction::Left]);
        board[(2, 2)] = Cell::Wall;
        let url = export_url(&BoardSettings::with_board(board.clone()));
        assert_eq!(url, format!("{URL_PREFIX}5x5b19"));

        board[(2, 2)] = Cell::Dead;
        assert_eq!(import_url(&url).unwrap().board, board);
    }

    #[test]
    fn export_skips_cells_outside_nine_by_nine() {
        let mut board = Board::new(12, 12);
        board[(10, 0)] = Cell::Token(Direction::Up);
        board[(0, 0)] = Cell::Token(Direction::Up);
        let url = export_url(&BoardSettings::with_board(board));
        assert_eq!(url, format!("{URL_PREFIX}0q"));
    }

    #[test]
    fn bad_urls() {
        assert!(matches!(
            import_url("http://earslap.com/projectslab/otomata"),
            Err(OtomataUrlError::MissingQuery)
        ));
        assert!(matches!(
            import_url("http://x/?q=0q1"),
            Err(OtomataUrlError::OddLength(_))
        ));
        assert!(matches!(
            import_url("http://x/?q=9q"),
            Err(OtomataUrlError::InvalidColumn('9'))
        ));
        assert!(matches!(
            import_url("http://x/?q=0Q"),
            Err(OtomataUrlError::InvalidRowState('Q'))
        ));
    }
}
