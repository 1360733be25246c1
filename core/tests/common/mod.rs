//! Live mock server for integration tests.

use std::time::Duration;

use product_core::{ProductClient, Transport};

/// Start the mock server on a random port in a background thread and return
/// a client pointed at its API root.
pub fn start_server() -> ProductClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    ProductClient::new(&format!("http://{addr}/api/v1"))
}

pub fn transport() -> Transport {
    Transport::new(Duration::from_secs(5))
}
