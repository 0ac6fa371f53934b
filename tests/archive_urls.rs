use mementoweb::urls::{fix_url, is_archive_url, is_valid_url, url_from_archive_url};

#[test]
fn archive_urls_unwrap_to_the_original() {
    let cases = [
        (
            "http://www.foo.org/not_a_ia_url.html",
            "http://www.foo.org/not_a_ia_url.html",
        ),
        (
            "http://web.archive.org/web/20071222090517/http://www.blah.org/",
            "http://www.blah.org/",
        ),
        (
            "http://web.archive.org/web/20070127071850rn_1/www.harding.edu/USER/fmccown/WWW/",
            "http://www.harding.edu/USER/fmccown/WWW/",
        ),
        (
            "http://api.wayback.archive.org/memento/20071222090517/http://www.foo.org/",
            "http://www.foo.org/",
        ),
        (
            "http://wayback.archive-it.org/all/20120117015404/http://www.cnn.com/",
            "http://www.cnn.com/",
        ),
        (
            "http://web.archive.org/web/20010410213930/http://www.cnn.com/cnnfn/2001/04/10/markets/markets_newyork/?s=2",
            "http://www.cnn.com/cnnfn/2001/04/10/markets/markets_newyork/?s=2",
        ),
        (
            "http://webarchive.nationalarchives.gov.uk/20120101000000/http://www.gov.uk/",
            "http://www.gov.uk/",
        ),
    ];
    for (archived, original) in cases {
        assert_eq!(url_from_archive_url(archived), original, "{}", archived);
    }
}

#[test]
fn archive_hosts_are_recognised() {
    assert!(is_archive_url("http://web.archive.org/web/20071222090517/http://www.blah.org/"));
    assert!(is_archive_url("http://api.wayback.archive.org/memento/20071222090517/http://www.foo.org/"));
    assert!(is_archive_url("http://wayback.archive-it.org/all/20120117015404/http://www.cnn.com/"));
    assert!(!is_archive_url("http://www.foo.org/"));
}

#[test]
fn fixing_adds_scheme_and_root() {
    assert_eq!(fix_url("foo.org"), "http://foo.org/");
    assert_eq!(fix_url("http://www.foo.org/"), "http://www.foo.org/");
    assert_eq!(fix_url("http://www.foo.org"), "http://www.foo.org/");
    assert_eq!(fix_url("https://www.foo.org/a/b"), "https://www.foo.org/a/b");
}

#[test]
fn validity_is_loose() {
    assert!(!is_valid_url(""));
    assert!(is_valid_url("http://foo"));
    assert!(is_valid_url("http://foo.BLAH"));
    assert!(is_valid_url("http://foo.org"));
    assert!(!is_valid_url("http:/foo.org/"));
    assert!(is_valid_url("http://foo.org/"));
    assert!(!is_valid_url("http://"));
    assert!(is_valid_url(
        "http://api.wayback.archive.org/memento/20071222090517/http://www.foo.org/"
    ));
}
