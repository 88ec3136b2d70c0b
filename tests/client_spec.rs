use speculate2::speculate;

speculate! {
    use dynasty::api;
    use dynasty::client::{ApiClient, ClientError};
    use dynasty::config::{Config, RunMode};
    use dynasty::models::*;
    use dynasty::Database;
    use reqwest::StatusCode;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to build runtime")
            .block_on(future)
    }

    /// Serves a fresh in-memory database on an ephemeral port.
    async fn spawn_server() -> (ApiClient, Database) {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        let config = Config {
            run_mode: RunMode::Test,
            ..Config::default()
        };
        let app = api::create_router(db.clone(), config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        let client = ApiClient::new(&format!("http://{addr}")).expect("Failed to build client");
        (client, db)
    }

    fn game(week: i32, location: Location, opponent: &str) -> Game {
        Game {
            week,
            location,
            opponent: Some(Opponent {
                name: opponent.to_string(),
                logo: None,
                rank: Some(12),
                record: None,
                is_rivalry: true,
            }),
            is_bye_week: false,
            is_conference_game: true,
            score: None,
            went_to_overtime: false,
        }
    }

    describe "typed client" {
        it "checks service and database health" {
            block_on(async {
                let (client, _db) = spawn_server().await;
                let health = client.health().await.unwrap();
                assert!(health.success);
                assert_eq!(health.environment, "test");
                let database = client.database_health().await.unwrap();
                assert_eq!(database.database.status, "connected");
            });
        }

        it "manages a season schedule" {
            block_on(async {
                let (client, _db) = spawn_server().await;

                let created = client.create_schedule(&CreateScheduleInput {
                    playthrough_id: "P1".into(),
                    year: 2024,
                    team_name: "Tigers".into(),
                    games: vec![game(2, Location::Home, "Alabama")],
                    metadata: None,
                }).await.unwrap();
                assert_eq!(created.games.len(), 1);

                let with_game = client.add_game("P1", 2024, &game(1, Location::Away, "Georgia")).await.unwrap();
                assert_eq!(with_game.games[0].week, 1);

                let scored = client.update_game("P1", 2024, 2, &GameUpdate {
                    score: Some(Some(Score { home: 24, away: 24 })),
                    went_to_overtime: Some(true),
                    ..Default::default()
                }).await.unwrap();
                assert_eq!(scored.result_for_week(2), Some(GameResult::Tie));

                let stats = client.schedule_stats("P1", 2024).await.unwrap();
                assert_eq!(stats.counts.total_games, 2);
                assert_eq!(stats.counts.overtime_games, 1);
                assert_eq!(stats.record.ties, 1);

                let removed = client.remove_game("P1", 2024, 1).await.unwrap();
                assert_eq!(removed.games.len(), 1);

                assert_eq!(client.schedules_by_team("Tigers").await.unwrap().len(), 1);
                client.delete_schedule("P1", 2024).await.unwrap();
                assert!(client.list_schedules().await.unwrap().is_empty());
            });
        }

        it "surfaces error envelopes as api errors" {
            block_on(async {
                let (client, _db) = spawn_server().await;

                match client.get_schedule("missing", 2024).await {
                    Err(ClientError::Api { status, message }) => {
                        assert_eq!(status, StatusCode::NOT_FOUND);
                        assert_eq!(message, "Schedule not found");
                    }
                    other => panic!("expected api error, got {other:?}"),
                }
            });
        }

        it "resolves coach schools and rivals" {
            block_on(async {
                let (client, db) = spawn_server().await;
                db.seed_schools(vec![
                    CreateSchoolInput {
                        name: "Texas A&M".into(),
                        icon: "https://cdn.example.test/tamu.png".into(),
                        conference: Conference::Sec,
                        city: "College Station".into(),
                        state: "TX".into(),
                        colors: vec!["#500000".into()],
                        mascot: Some("Aggies".into()),
                        rivals: vec!["Texas".into()],
                        is_active: true,
                    },
                    CreateSchoolInput {
                        name: "Texas".into(),
                        icon: "https://cdn.example.test/texas.png".into(),
                        conference: Conference::Sec,
                        city: "Austin".into(),
                        state: "TX".into(),
                        colors: vec!["#BF5700".into()],
                        mascot: Some("Longhorns".into()),
                        rivals: vec!["Texas A&M".into()],
                        is_active: true,
                    },
                ]).unwrap();

                let aggies = client.get_school("Texas A&M").await.unwrap();
                let rivals = client.school_rivals("Texas A&M").await.unwrap();
                assert_eq!(rivals.len(), 1);
                assert_eq!(rivals[0].name, "Texas");
                assert_eq!(client.schools_by_state("TX").await.unwrap().len(), 2);

                let coach = client.create_coach(&CreateCoachInput {
                    playthrough_id: "P9".into(),
                    first_name: "Mike".into(),
                    last_name: "Elko".into(),
                    style: CoachStyle::Tactician,
                    selected_team: aggies.id,
                    alma_mater: rivals[0].id,
                    pipeline: "Texas".into(),
                }).await.unwrap();
                assert_eq!(coach.selected_team.school().map(|s| s.name.as_str()), Some("Texas A&M"));

                let recent = client.most_recent_coach().await.unwrap();
                assert_eq!(recent.playthrough_id, "P9");
            });
        }
    }
}
