use may_minihttp::Response;

use crate::response::{Finished, CT_HTML, CT_JSON};

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write the guard's buffered terminal payload to the transport response.
pub fn write_finished(res: &mut Response, finished: Finished) {
    res.status_code(finished.status as usize, status_reason(finished.status));
    if finished.content_type == CT_JSON {
        res.header("Content-Type: application/json");
    } else if finished.content_type == CT_HTML {
        res.header("Content-Type: text/html");
    } else {
        res.header("Content-Type: text/plain");
    }
    res.body_vec(finished.body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(500), "Internal Server Error");
    }
}
