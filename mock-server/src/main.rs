use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "4010".to_string());
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    println!("mock server listening on 127.0.0.1:{port}");
    mock_server::run(listener).await
}
