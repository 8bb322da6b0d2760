//! Standard algebraic notation on top of `chess::Board`.
//!
//! The `chess` crate has no SAN writer, so formatting is done here; parsing
//! matches the text against the SAN of every legal move, which keeps the two
//! directions consistent with each other.

use chess::{Board, BoardStatus, ChessMove, MoveGen, Piece, Square};
use std::str::FromStr;

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(square: Square) -> char {
    (b'a' + square.get_file().to_index() as u8) as char
}

fn rank_char(square: Square) -> char {
    (b'1' + square.get_rank().to_index() as u8) as char
}

/// Origin qualifier needed when another piece of the same kind can reach `dest`
fn disambiguation(board: &Board, piece: Piece, source: Square, dest: Square) -> String {
    let rivals: Vec<Square> = MoveGen::new_legal(board)
        .filter(|m| {
            m.get_dest() == dest
                && m.get_source() != source
                && board.piece_on(m.get_source()) == Some(piece)
        })
        .map(|m| m.get_source())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.get_file() != source.get_file()) {
        file_char(source).to_string()
    } else if rivals.iter().all(|sq| sq.get_rank() != source.get_rank()) {
        rank_char(source).to_string()
    } else {
        format!("{}{}", file_char(source), rank_char(source))
    }
}

/// Format a legal move in SAN, including the `+`/`#` suffix
pub fn format_san(board: &Board, chess_move: ChessMove) -> String {
    let source = chess_move.get_source();
    let dest = chess_move.get_dest();
    let piece = match board.piece_on(source) {
        Some(piece) => piece,
        None => return chess_move.to_string(),
    };

    let mut san = String::new();
    let file_shift = source
        .get_file()
        .to_index()
        .abs_diff(dest.get_file().to_index());

    if piece == Piece::King && file_shift == 2 {
        if dest.get_file().to_index() > source.get_file().to_index() {
            san.push_str("O-O");
        } else {
            san.push_str("O-O-O");
        }
    } else {
        let is_capture = board.piece_on(dest).is_some()
            || (piece == Piece::Pawn && source.get_file() != dest.get_file());

        if piece == Piece::Pawn {
            if is_capture {
                san.push(file_char(source));
            }
        } else {
            san.push(piece_letter(piece));
            san.push_str(&disambiguation(board, piece, source, dest));
        }
        if is_capture {
            san.push('x');
        }
        san.push_str(&dest.to_string());
        if let Some(promotion) = chess_move.get_promotion() {
            san.push('=');
            san.push(piece_letter(promotion));
        }
    }

    let after = board.make_move_new(chess_move);
    if after.status() == BoardStatus::Checkmate {
        san.push('#');
    } else if after.checkers().popcnt() > 0 {
        san.push('+');
    }
    san
}

fn normalize(text: &str) -> String {
    let trimmed = text
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    trimmed
        .replace("0-0-0", "O-O-O")
        .replace("0-0", "O-O")
        .replace('=', "")
}

/// Parse SAN (or UCI coordinate notation) into a move that is legal on `board`
pub fn parse_move(board: &Board, text: &str) -> Option<ChessMove> {
    let wanted = normalize(text);
    if wanted.is_empty() {
        return None;
    }

    if let Some(found) =
        MoveGen::new_legal(board).find(|m| normalize(&format_san(board, *m)) == wanted)
    {
        return Some(found);
    }

    // Coordinate notation such as "e2e4" or "e7e8q"
    ChessMove::from_str(text.trim())
        .ok()
        .filter(|m| board.legal(*m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_str(fen).unwrap()
    }

    #[test]
    fn test_format_simple_moves() {
        let start = Board::default();
        assert_eq!(
            format_san(&start, ChessMove::new(Square::E2, Square::E4, None)),
            "e4"
        );
        assert_eq!(
            format_san(&start, ChessMove::new(Square::G1, Square::F3, None)),
            "Nf3"
        );
    }

    #[test]
    fn test_format_capture_and_check() {
        // 1.e4 d5 2.exd5
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        assert_eq!(
            format_san(&b, ChessMove::new(Square::E4, Square::D5, None)),
            "exd5"
        );

        // Scholar's mate
        let b = board("r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
        assert_eq!(
            format_san(&b, ChessMove::new(Square::H5, Square::F7, None)),
            "Qxf7#"
        );
    }

    #[test]
    fn test_format_castling_and_disambiguation() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(
            format_san(&b, ChessMove::new(Square::E1, Square::G1, None)),
            "O-O"
        );
        assert_eq!(
            format_san(&b, ChessMove::new(Square::E1, Square::C1, None)),
            "O-O-O"
        );

        let b = board("4k3/8/8/8/8/8/8/R4RK1 w - - 0 1");
        assert_eq!(
            format_san(&b, ChessMove::new(Square::A1, Square::D1, None)),
            "Rad1"
        );
    }

    #[test]
    fn test_format_promotion() {
        let b = board("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        assert_eq!(
            format_san(&b, ChessMove::new(Square::E7, Square::E8, Some(Piece::Queen))),
            "e8=Q"
        );
    }

    #[test]
    fn test_parse_round_trip_on_start_position() {
        let start = Board::default();
        for chess_move in MoveGen::new_legal(&start) {
            let san = format_san(&start, chess_move);
            assert_eq!(parse_move(&start, &san), Some(chess_move));
        }
    }

    #[test]
    fn test_parse_variants() {
        let start = Board::default();
        let e4 = ChessMove::new(Square::E2, Square::E4, None);
        assert_eq!(parse_move(&start, "e2e4"), Some(e4));
        assert_eq!(parse_move(&start, " e4 "), Some(e4));
        assert_eq!(parse_move(&start, "e5"), None);
        assert_eq!(parse_move(&start, "Zz9"), None);
        assert_eq!(parse_move(&start, ""), None);

        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(
            parse_move(&b, "0-0"),
            Some(ChessMove::new(Square::E1, Square::G1, None))
        );
    }
}
